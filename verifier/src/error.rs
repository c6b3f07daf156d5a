// Copyright (c) 2023 The MobileCoin Foundation

/// Result type for certificate decoding and verification
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for decoding and verifying certificate chains.
#[derive(Clone, Debug, displaydoc::Display, PartialEq, Eq)]
pub enum Error {
    /// The chain was empty or longer than the supported maximum
    InvalidInput,
    /// The issuer of a certificate does not match the subject of its signer
    InvalidCertificate,
    /// A certificate signature does not verify under the signer's key
    InvalidSignature,
    /// A certificate is outside of its validity window
    CertificateExpired,
    /// A certificate carries invalid or unrecognised critical extensions
    InvalidExtensions,
    /// A certificate authority exceeded its path length constraint
    InvalidPathlen,
    /// The chain terminates in a self-signed certificate that is not a trust anchor
    SelfSigned,
    /// No trust anchor issued the top of the chain
    NoTrustAnchor,
    /// The server certificate carries invalid or unrecognised critical extensions
    InvalidServerExtensions,
    /// The server certificate does not vouch for the requested server name
    InvalidServerName,
    /// A trust anchor candidate is not a self-signed certificate authority
    InvalidCA,
    /// An error occurred decoding the DER representation
    DerDecoding(x509_cert::der::Error),
    /// An error occurred decoding the PEM representation
    PemDecoding(pem_rfc7468::Error),
    /// An error occurred decoding the signature from a certificate
    SignatureDecoding,
    /// An error occurred decoding the key from a certificate
    KeyDecoding,
}

impl From<x509_cert::der::Error> for Error {
    fn from(src: x509_cert::der::Error) -> Self {
        Error::DerDecoding(src)
    }
}

impl From<pem_rfc7468::Error> for Error {
    fn from(src: pem_rfc7468::Error) -> Self {
        Error::PemDecoding(src)
    }
}
