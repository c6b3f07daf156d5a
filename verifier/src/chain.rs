// Copyright (c) 2023 The MobileCoin Foundation

//! Verification of server certificate chains
//!
//! The chain walk runs in stages, each of which short-circuits on the
//! first failure: the leaf is checked for the server role, every
//! intermediate for the certificate-authority role, then the issuer
//! relations are climbed from the leaf upwards, and finally the top of
//! the chain is resolved against the trust anchors.

extern crate alloc;

use crate::algorithm::PublicKey;
use crate::anchors::TrustAnchors;
use crate::certs::UnverifiedCertificate;
use crate::{Error, Result};
use alloc::vec::Vec;
use core::time::Duration;

/// Maximum number of certificates accepted in a presented chain.
///
/// Longer inputs are rejected as [`Error::InvalidInput`] before any
/// verification work is done.
pub const MAX_CHAIN_LENGTH: usize = 10;

/// One hop of a chain walk, as observed through the trace sink of
/// [`CertificateChain::verify_server_traced`].
#[derive(Clone, Debug)]
pub struct HopTrace<'a> {
    /// Common Name of the issuing certificate, when it carries one
    pub subject_cn: Option<&'a str>,
    /// Number of intermediates between the leaf and the issuing certificate
    pub path_len: u32,
    /// Outcome of the hop's relation checks
    pub outcome: Result<()>,
}

/// An X509 certificate chain as presented by a peer: the server
/// certificate first, followed by the intermediates in signing order.
#[derive(Debug)]
pub struct CertificateChain {
    certificates: Vec<UnverifiedCertificate>,
}

impl CertificateChain {
    /// Create a chain from already decoded certificates.
    pub fn new(certificates: Vec<UnverifiedCertificate>) -> Self {
        Self { certificates }
    }

    /// Verify that this chain authenticates `server_name` at `unix_time`.
    ///
    /// On success the server certificate's public key is returned for use
    /// in the rest of the handshake.
    pub fn verify_server(
        &self,
        anchors: &TrustAnchors,
        unix_time: Duration,
        server_name: Option<&str>,
    ) -> Result<PublicKey> {
        self.verify_server_traced(anchors, unix_time, server_name, &mut |_| ())
    }

    /// [`CertificateChain::verify_server`] with a per-hop trace sink.
    ///
    /// The sink observes every issuer relation as it is checked. It never
    /// alters the outcome.
    pub fn verify_server_traced(
        &self,
        anchors: &TrustAnchors,
        unix_time: Duration,
        server_name: Option<&str>,
        trace: &mut dyn FnMut(HopTrace<'_>),
    ) -> Result<PublicKey> {
        if self.certificates.len() > MAX_CHAIN_LENGTH {
            return Err(Error::InvalidInput);
        }
        let (leaf, intermediates) = self
            .certificates
            .split_first()
            .ok_or(Error::InvalidInput)?;

        leaf.verify_leaf(unix_time, server_name)?;
        for certificate in intermediates {
            certificate.verify_intermediate(unix_time)?;
        }

        let mut path_len = 0u32;
        let mut current = leaf;
        for superior in intermediates {
            let outcome = superior.verify_issued(current, path_len);
            trace(HopTrace {
                subject_cn: superior.subject_common_name(),
                path_len,
                outcome: outcome.clone(),
            });
            outcome?;
            current = superior;
            path_len += 1;
        }

        match anchors.find_issuer(current) {
            None if current.is_self_issued() => Err(Error::SelfSigned),
            None => Err(Error::NoTrustAnchor),
            Some(anchor) => {
                anchor.verify_validity(unix_time)?;
                let outcome = anchor.verify_issued(current, path_len);
                trace(HopTrace {
                    subject_cn: anchor.subject_common_name(),
                    path_len,
                    outcome: outcome.clone(),
                });
                outcome?;
                Ok(leaf.public_key().clone())
            }
        }
    }
}

/// Convert a slice of DER-encoded certificates into a [`CertificateChain`].
impl TryFrom<&[&[u8]]> for CertificateChain {
    type Error = Error;

    fn try_from(der_chain: &[&[u8]]) -> Result<Self> {
        let certificates = der_chain
            .iter()
            .map(|der| UnverifiedCertificate::try_from(*der))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(certificates))
    }
}
