// Copyright (c) 2023 The MobileCoin Foundation

#![doc = include_str!("../README.md")]
#![deny(missing_docs, missing_debug_implementations, unsafe_code)]
#![no_std]

mod algorithm;
mod anchors;
mod certs;
mod chain;
mod error;
mod extensions;
mod name;
mod prep;

pub use algorithm::{PublicKey, SignatureAlgorithm};
pub use anchors::TrustAnchors;
pub use certs::{UnverifiedCertificate, VerifiedCertificate};
pub use chain::{CertificateChain, HopTrace, MAX_CHAIN_LENGTH};
pub use error::{Error, Result};
pub use name::DistinguishedName;
