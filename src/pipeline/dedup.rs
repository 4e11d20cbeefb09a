//! Near-duplicate page detection.
//!
//! Pages are visited once, in document order. A single *reference hash* is
//! kept: the hash of the last page that was retained. Each later page is
//! compared against that reference only:
//!
//! ```text
//! cutoff = (1 - threshold / 100) * len(hash)²
//! distance(page, reference) <  cutoff  → delete, reference unchanged
//! distance(page, reference) >= cutoff  → keep,   page becomes reference
//! ```
//!
//! Because the reference only moves on a keep, a run of near-identical slides
//! is measured against the first slide of the run rather than drifting one
//! page at a time. Non-adjacent repeats (A B A) are not detected.
//!
//! `len(hash)` is the edge length of the square hash matrix, so for the
//! default 8×8 hash the cutoff at threshold 90 is `0.1 × 64 = 6.4` bits.
//! Thresholds outside 0–100 and zero-length hashes are fed through the same
//! formula without special cases: threshold 100 (or a zero-length hash)
//! gives cutoff 0 and nothing is ever deleted.

use super::hash::PerceptualHash;
use serde::{Deserialize, Serialize};

/// Outcome for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionDecision {
    Keep,
    Delete,
}

/// Bit-distance below which a page counts as a near-duplicate.
pub fn similarity_cutoff(threshold: f64, hash_len: u32) -> f64 {
    let len = f64::from(hash_len);
    (1.0 - threshold / 100.0) * len * len
}

/// Streaming duplicate detector for one document.
///
/// Feed page hashes in document order with [`observe`](Self::observe);
/// collect the result with [`into_deleted`](Self::into_deleted).
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    threshold: f64,
    reference: Option<PerceptualHash>,
    pages_seen: usize,
    deleted: Vec<usize>,
}

impl DuplicateDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            reference: None,
            pages_seen: 0,
            deleted: Vec::new(),
        }
    }

    /// Decide the next page (1-indexed position = number of pages observed).
    ///
    /// Hashes of a different length than the reference cannot be compared
    /// and are kept.
    pub fn observe(&mut self, hash: PerceptualHash) -> RetentionDecision {
        self.pages_seen += 1;

        let Some(reference) = &self.reference else {
            self.reference = Some(hash);
            return RetentionDecision::Keep;
        };

        let cutoff = similarity_cutoff(self.threshold, hash.len());
        let is_duplicate = reference
            .distance(&hash)
            .is_some_and(|d| f64::from(d) < cutoff);

        if is_duplicate {
            self.deleted.push(self.pages_seen);
            RetentionDecision::Delete
        } else {
            self.reference = Some(hash);
            RetentionDecision::Keep
        }
    }

    pub fn pages_seen(&self) -> usize {
        self.pages_seen
    }

    /// Hash of the last retained page.
    pub fn reference(&self) -> Option<&PerceptualHash> {
        self.reference.as_ref()
    }

    /// Page numbers marked so far (1-indexed, in encounter order).
    pub fn deleted(&self) -> &[usize] {
        &self.deleted
    }

    pub fn into_deleted(self) -> Vec<usize> {
        self.deleted
    }
}

/// Run the detector over a full sequence of page hashes.
pub fn find_duplicates<I>(hashes: I, threshold: f64) -> Vec<usize>
where
    I: IntoIterator<Item = PerceptualHash>,
{
    let mut detector = DuplicateDetector::new(threshold);
    for hash in hashes {
        detector.observe(hash);
    }
    detector.into_deleted()
}
