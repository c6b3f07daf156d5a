// Copyright (c) 2023 The MobileCoin Foundation

//! Signature algorithms and public keys used in certificate verification
//!
//! The verifier supports the RSA-PKCS#1 v1.5 signature scheme with the MD5
//! and SHA-1 digests. The scheme's encoded-message comparison ties the
//! recovered DigestInfo to the hash named by the certificate's outer
//! signature algorithm, so a signature made with one digest never verifies
//! under an identifier naming the other.

use crate::{Error, Result};
use const_oid::ObjectIdentifier;
use md5::Md5;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::Pkcs1v15Sign;
use sha1::{Digest, Sha1};
use x509_cert::der::{Decode, Encode, Header, Reader, SliceReader};
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

const OID_PKCS1_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const OID_PKCS1_MD5_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.4");
const OID_PKCS1_SHA1_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");

/// Signature algorithm named by a certificate's outer `AlgorithmIdentifier`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// RSA-PKCS#1 v1.5 over an MD5 digest
    Md5WithRsa,
    /// RSA-PKCS#1 v1.5 over a SHA-1 digest
    Sha1WithRsa,
}

impl TryFrom<&AlgorithmIdentifierOwned> for SignatureAlgorithm {
    type Error = Error;

    fn try_from(algorithm: &AlgorithmIdentifierOwned) -> Result<Self> {
        match algorithm.oid {
            OID_PKCS1_MD5_WITH_RSA => Ok(SignatureAlgorithm::Md5WithRsa),
            OID_PKCS1_SHA1_WITH_RSA => Ok(SignatureAlgorithm::Sha1WithRsa),
            _ => Err(Error::SignatureDecoding),
        }
    }
}

/// Public key used to verify certificate signatures
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(rsa::RsaPublicKey);

impl PublicKey {
    /// Verify that `signature` is valid for `message` under this key.
    ///
    /// The `message` is digested with the hash named by `algorithm` before
    /// the PKCS#1 v1.5 comparison.
    pub fn verify(
        &self,
        message: &[u8],
        algorithm: SignatureAlgorithm,
        signature: &[u8],
    ) -> Result<()> {
        let verification = match algorithm {
            SignatureAlgorithm::Md5WithRsa => {
                self.0
                    .verify(Pkcs1v15Sign::new::<Md5>(), &Md5::digest(message), signature)
            }
            SignatureAlgorithm::Sha1WithRsa => {
                self.0
                    .verify(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(message), signature)
            }
        };
        verification.map_err(|_| Error::InvalidSignature)
    }
}

/// Create a [`PublicKey`] from a [`SubjectPublicKeyInfoOwned`]
impl TryFrom<&SubjectPublicKeyInfoOwned> for PublicKey {
    type Error = Error;

    fn try_from(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        if spki.algorithm.oid != OID_PKCS1_RSA_ENCRYPTION {
            return Err(Error::KeyDecoding);
        }
        let bytes = spki.subject_public_key.as_bytes().ok_or(Error::KeyDecoding)?;
        let key = rsa::RsaPublicKey::from_pkcs1_der(bytes).map_err(|_| Error::KeyDecoding)?;
        Ok(PublicKey(key))
    }
}

/// The DER bytes of the `tbsCertificate` inside `raw`.
///
/// The span is taken from the DER structure itself: the outer certificate
/// header is consumed and the following header gives the extent of the
/// signed region. Signatures cover these exact bytes, never a re-encoding.
pub(crate) fn tbs_der(raw: &[u8]) -> Result<&[u8]> {
    let mut reader = SliceReader::new(raw)?;
    Header::decode(&mut reader)?;
    let start = usize::try_from(reader.position())?;
    let tbs_header = Header::decode(&mut reader)?;
    let span = usize::try_from((tbs_header.encoded_len()? + tbs_header.length)?)?;
    raw.get(start..start + span).ok_or_else(|| {
        Error::from(x509_cert::der::Error::from(
            x509_cert::der::ErrorKind::Length {
                tag: tbs_header.tag,
            },
        ))
    })
}
