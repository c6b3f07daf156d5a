// Copyright (c) 2023 The MobileCoin Foundation

//! Trust anchor storage and issuer lookup

extern crate alloc;

use crate::certs::{UnverifiedCertificate, VerifiedCertificate};
use alloc::vec::Vec;
use core::time::Duration;

/// Store of validated trust anchors.
///
/// Candidates are self-verified once at construction time and only the
/// survivors are retained; loading the candidates from disk or an OS
/// store is the caller's concern. The store is read-only afterwards and
/// can back any number of concurrent chain verifications.
#[derive(Debug)]
pub struct TrustAnchors {
    anchors: Vec<VerifiedCertificate>,
    candidates: usize,
}

impl TrustAnchors {
    /// Validate `candidates` at `unix_time` and retain the survivors.
    pub fn new(candidates: Vec<UnverifiedCertificate>, unix_time: Duration) -> Self {
        let attempted = candidates.len();
        let anchors = candidates
            .into_iter()
            .filter_map(|candidate| candidate.verify_self_signed(unix_time).ok())
            .collect();
        Self {
            anchors,
            candidates: attempted,
        }
    }

    /// Number of anchors retained.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// True when no candidate survived validation.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Number of candidates handed to the constructor.
    pub fn candidate_count(&self) -> usize {
        self.candidates
    }

    /// The anchor that issued `child`, when exactly one qualifies.
    ///
    /// Anchors are matched by subject against the child's issuer name. A
    /// single match must also be consistent with the authority/subject
    /// key-identifier hint. More than one name match gives up rather than
    /// guessing.
    pub fn find_issuer(&self, child: &UnverifiedCertificate) -> Option<&VerifiedCertificate> {
        let mut matches = self
            .anchors
            .iter()
            .filter(|anchor| anchor.subject() == child.issuer());
        let anchor = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        anchor.key_identifier_matches(child).then_some(anchor)
    }
}
