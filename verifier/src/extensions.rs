// Copyright (c) 2023 The MobileCoin Foundation

//! Typed queries over certificate extensions
//!
//! Accessors decode the recognised extension payloads out of the raw
//! extension list. Criticality is policed per RFC 5280
//! [section 4.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.2):
//! a critical extension the verifier does not handle for the certificate's
//! role rejects the certificate.

use crate::{Error, Result};
use const_oid::{AssociatedOid, ObjectIdentifier};
use x509_cert::der::Decode;
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, CertificatePolicies, ExtendedKeyUsage, KeyUsage,
    SubjectAltName, SubjectKeyIdentifier,
};
use x509_cert::ext::Extension;
use x509_cert::TbsCertificate;

/// Extensions handled on certificate-authority certificates.
pub(crate) const CA_HANDLED: [ObjectIdentifier; 2] = [BasicConstraints::OID, KeyUsage::OID];

/// Extensions handled on server certificates.
pub(crate) const SERVER_HANDLED: [ObjectIdentifier; 5] = [
    BasicConstraints::OID,
    KeyUsage::OID,
    ExtendedKeyUsage::OID,
    CertificatePolicies::OID,
    SubjectAltName::OID,
];

/// A decoded extension payload together with its criticality flag.
#[derive(Debug)]
pub(crate) struct ExtensionValue<T> {
    pub critical: bool,
    pub value: T,
}

/// Typed accessor over the raw extension list of a certificate.
#[derive(Debug)]
pub(crate) struct CertificateExtensions<'a>(pub(crate) Option<&'a [Extension]>);

impl<'a> From<&'a TbsCertificate> for CertificateExtensions<'a> {
    fn from(tbs: &'a TbsCertificate) -> Self {
        Self(tbs.extensions.as_deref())
    }
}

impl<'a> CertificateExtensions<'a> {
    pub fn basic_constraints(&self) -> Result<Option<ExtensionValue<BasicConstraints>>> {
        self.decode()
    }

    pub fn key_usage(&self) -> Result<Option<ExtensionValue<KeyUsage>>> {
        self.decode()
    }

    pub fn ext_key_usage(&self) -> Result<Option<ExtensionValue<ExtendedKeyUsage>>> {
        self.decode()
    }

    pub fn subject_key_id(&self) -> Result<Option<ExtensionValue<SubjectKeyIdentifier>>> {
        self.decode()
    }

    pub fn authority_key_id(&self) -> Result<Option<ExtensionValue<AuthorityKeyIdentifier>>> {
        self.decode()
    }

    pub fn subject_alt_name(&self) -> Result<Option<ExtensionValue<SubjectAltName>>> {
        self.decode()
    }

    pub fn policies(&self) -> Result<Option<ExtensionValue<CertificatePolicies>>> {
        self.decode()
    }

    /// Reject any critical extension whose type is not in `handled`.
    pub fn reject_unknown_critical(&self, handled: &[ObjectIdentifier]) -> Result<()> {
        for extension in self.all() {
            if extension.critical && !handled.contains(&extension.extn_id) {
                return Err(Error::InvalidExtensions);
            }
        }
        Ok(())
    }

    fn decode<T: AssociatedOid + Decode<'a>>(&self) -> Result<Option<ExtensionValue<T>>> {
        match self.all().iter().find(|extension| extension.extn_id == T::OID) {
            None => Ok(None),
            Some(extension) => {
                let value = T::from_der(extension.extn_value.as_bytes())
                    .map_err(|_| Error::InvalidExtensions)?;
                Ok(Some(ExtensionValue {
                    critical: extension.critical,
                    value,
                }))
            }
        }
    }

    fn all(&self) -> &'a [Extension] {
        self.0.unwrap_or(&[])
    }
}
