// Copyright (c) 2023 The MobileCoin Foundation

//! Certificate decoding and per-certificate verification
//!
//! Certificates are decoded into [`UnverifiedCertificate`]s, which carry
//! the original DER beside the parsed form. The role verifiers cover the
//! three positions a certificate can hold on a server chain: the server
//! (leaf) certificate, a certificate-authority intermediate, and a
//! self-signed trust anchor. [`UnverifiedCertificate::verify_issued`]
//! covers the relation between a certificate and the one it signed.

extern crate alloc;

use crate::algorithm::{tbs_der, PublicKey, SignatureAlgorithm};
use crate::extensions::{CertificateExtensions, CA_HANDLED, SERVER_HANDLED};
use crate::name::DistinguishedName;
use crate::{Error, Result};
use alloc::vec::Vec;
use const_oid::ObjectIdentifier;
use core::time::Duration;
use x509_cert::der::Decode;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::KeyUsages;
use x509_cert::Certificate as X509Certificate;

const OID_KP_SERVER_AUTH: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.1");
const OID_ANY_POLICY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.32.0");

/// A certificate whose signature has not been verified against an issuer.
#[derive(Debug, PartialEq, Eq)]
pub struct UnverifiedCertificate {
    // Signatures cover the original DER encoding of the tbs region, so
    // the raw bytes are kept beside the decoded certificate.
    der_bytes: Vec<u8>,
    certificate: X509Certificate,
    // The signature, its algorithm and the subject key are pulled out at
    // decode time so that malformed certificates fail before any
    // verification is attempted.
    signature: Vec<u8>,
    algorithm: SignatureAlgorithm,
    key: PublicKey,
}

/// Convert a DER-encoded certificate into an [`UnverifiedCertificate`].
impl TryFrom<&[u8]> for UnverifiedCertificate {
    type Error = Error;

    fn try_from(der_bytes: &[u8]) -> Result<Self> {
        let certificate = X509Certificate::from_der(der_bytes)?;
        let signature = certificate
            .signature
            .as_bytes()
            .ok_or(Error::SignatureDecoding)?
            .to_vec();
        let algorithm = SignatureAlgorithm::try_from(&certificate.signature_algorithm)?;
        let key = PublicKey::try_from(&certificate.tbs_certificate.subject_public_key_info)?;
        Ok(UnverifiedCertificate {
            der_bytes: der_bytes.to_vec(),
            certificate,
            signature,
            algorithm,
            key,
        })
    }
}

/// Convert a PEM-encoded certificate into an [`UnverifiedCertificate`].
impl TryFrom<&str> for UnverifiedCertificate {
    type Error = Error;

    fn try_from(pem: &str) -> Result<Self> {
        let (label, der_bytes) = pem_rfc7468::decode_vec(pem.as_bytes())?;
        if label != "CERTIFICATE" {
            return Err(Error::PemDecoding(pem_rfc7468::Error::Label));
        }
        Self::try_from(der_bytes.as_slice())
    }
}

impl UnverifiedCertificate {
    /// The subject name.
    pub fn subject(&self) -> DistinguishedName<'_> {
        DistinguishedName::from(&self.certificate.tbs_certificate.subject)
    }

    /// The issuer name.
    pub fn issuer(&self) -> DistinguishedName<'_> {
        DistinguishedName::from(&self.certificate.tbs_certificate.issuer)
    }

    /// The subject public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    /// True when subject and issuer name match.
    pub fn is_self_issued(&self) -> bool {
        self.subject() == self.issuer()
    }

    /// Verify this certificate fills the server (leaf) role.
    ///
    /// The certificate must be inside its validity window, vouch for
    /// `server_name`, and carry server-compatible extensions. An absent
    /// `server_name` fails closed.
    pub fn verify_leaf(&self, unix_time: Duration, server_name: Option<&str>) -> Result<()> {
        self.verify_validity(unix_time)?;
        self.verify_server_name(server_name)?;
        self.leaf_extension_checks()
            .map_err(|_| Error::InvalidServerExtensions)
    }

    /// Verify this certificate fills the certificate-authority role.
    pub fn verify_intermediate(&self, unix_time: Duration) -> Result<()> {
        self.verify_validity(unix_time)?;
        self.ca_extension_checks()
    }

    /// Verify this certificate as a candidate trust anchor.
    ///
    /// The certificate must be self-signed, its signature must verify
    /// under its own key, and it must hold the certificate-authority role
    /// at `unix_time`.
    pub fn verify_self_signed(self, unix_time: Duration) -> Result<VerifiedCertificate> {
        if !self.is_self_issued() {
            return Err(Error::InvalidCA);
        }
        self.verify_signature_from(&self.key)?;
        self.verify_validity(unix_time)?;
        self.ca_extension_checks()?;
        Ok(VerifiedCertificate { inner: self })
    }

    /// Verify that this certificate issued `child`.
    ///
    /// `path_len` is the number of intermediates already traversed between
    /// the leaf and this certificate. The checks run in a fixed order so
    /// that the reported failure is deterministic: name chaining, then the
    /// key-identifier hint, then the signature, then the path length
    /// budget.
    pub fn verify_issued(&self, child: &UnverifiedCertificate, path_len: u32) -> Result<()> {
        if self.subject() != child.issuer() {
            return Err(Error::InvalidCertificate);
        }
        if !key_identifier_hint(self, child)? {
            return Err(Error::InvalidExtensions);
        }
        child.verify_signature_from(&self.key)?;
        if let Some(constraints) = self.extensions().basic_constraints()? {
            if let Some(limit) = constraints.value.path_len_constraint {
                if u32::from(limit) < path_len {
                    return Err(Error::InvalidPathlen);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn subject_common_name(&self) -> Option<&str> {
        self.subject().common_name()
    }

    pub(crate) fn verify_validity(&self, unix_time: Duration) -> Result<()> {
        let validity = &self.certificate.tbs_certificate.validity;
        if unix_time < validity.not_before.to_unix_duration()
            || unix_time > validity.not_after.to_unix_duration()
        {
            return Err(Error::CertificateExpired);
        }
        Ok(())
    }

    fn extensions(&self) -> CertificateExtensions<'_> {
        CertificateExtensions::from(&self.certificate.tbs_certificate)
    }

    fn verify_signature_from(&self, issuer_key: &PublicKey) -> Result<()> {
        let tbs = tbs_der(&self.der_bytes)?;
        issuer_key.verify(tbs, self.algorithm, &self.signature)
    }

    fn verify_server_name(&self, server_name: Option<&str>) -> Result<()> {
        let reference = server_name.ok_or(Error::InvalidServerName)?;
        let alt_name = self
            .extensions()
            .subject_alt_name()
            .map_err(|_| Error::InvalidServerExtensions)?;
        let matched = match alt_name {
            Some(names) => names.value.0.iter().any(|general| match general {
                GeneralName::DnsName(dns) => dns.as_str().eq_ignore_ascii_case(reference),
                _ => false,
            }),
            None => self
                .subject_common_name()
                .is_some_and(|cn| cn.eq_ignore_ascii_case(reference)),
        };
        if matched {
            Ok(())
        } else {
            Err(Error::InvalidServerName)
        }
    }

    fn ca_extension_checks(&self) -> Result<()> {
        let extensions = self.extensions();
        match extensions.basic_constraints()? {
            Some(constraints) if constraints.value.ca => (),
            _ => return Err(Error::InvalidExtensions),
        }
        match extensions.key_usage()? {
            Some(usage) if usage.value.0.contains(KeyUsages::KeyCertSign) => (),
            _ => return Err(Error::InvalidExtensions),
        }
        extensions.reject_unknown_critical(&CA_HANDLED)
    }

    fn leaf_extension_checks(&self) -> Result<()> {
        let extensions = self.extensions();
        if let Some(constraints) = extensions.basic_constraints()? {
            if constraints.value.ca || constraints.value.path_len_constraint.is_some() {
                return Err(Error::InvalidExtensions);
            }
        }
        if let Some(usage) = extensions.key_usage()? {
            if !usage.value.0.contains(KeyUsages::KeyEncipherment) {
                return Err(Error::InvalidExtensions);
            }
        }
        if let Some(purposes) = extensions.ext_key_usage()? {
            if !purposes.value.0.contains(&OID_KP_SERVER_AUTH) {
                return Err(Error::InvalidExtensions);
            }
        }
        if let Some(policies) = extensions.policies()? {
            if policies.critical
                && !policies
                    .value
                    .0
                    .iter()
                    .any(|info| info.policy_identifier == OID_ANY_POLICY)
            {
                return Err(Error::InvalidExtensions);
            }
        }
        extensions.reject_unknown_critical(&SERVER_HANDLED)
    }
}

/// A trust-anchor certificate that has passed self-verification.
#[derive(Debug, PartialEq, Eq)]
pub struct VerifiedCertificate {
    inner: UnverifiedCertificate,
}

impl VerifiedCertificate {
    /// The subject name.
    pub fn subject(&self) -> DistinguishedName<'_> {
        self.inner.subject()
    }

    /// The subject public key.
    pub fn public_key(&self) -> &PublicKey {
        self.inner.public_key()
    }

    /// Verify that this anchor issued `child`, as
    /// [`UnverifiedCertificate::verify_issued`].
    pub fn verify_issued(&self, child: &UnverifiedCertificate, path_len: u32) -> Result<()> {
        self.inner.verify_issued(child, path_len)
    }

    pub(crate) fn subject_common_name(&self) -> Option<&str> {
        self.inner.subject_common_name()
    }

    pub(crate) fn verify_validity(&self, unix_time: Duration) -> Result<()> {
        self.inner.verify_validity(unix_time)
    }

    pub(crate) fn key_identifier_matches(&self, child: &UnverifiedCertificate) -> bool {
        matches!(key_identifier_hint(&self.inner, child), Ok(true))
    }
}

/// The authority/subject key-identifier hint between `issuer` and `child`.
///
/// `Ok(true)` when the identifiers agree or either side omits them; the
/// identifiers are a hint, not mandatory.
fn key_identifier_hint(issuer: &UnverifiedCertificate, child: &UnverifiedCertificate) -> Result<bool> {
    let authority = match child.extensions().authority_key_id()? {
        Some(identifier) => match identifier.value.key_identifier {
            Some(authority) => authority,
            None => return Ok(true),
        },
        None => return Ok(true),
    };
    let subject = match issuer.extensions().subject_key_id()? {
        Some(identifier) => identifier.value.0,
        None => return Ok(true),
    };
    Ok(authority.as_bytes() == subject.as_bytes())
}
