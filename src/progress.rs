//! Progress-callback trait for per-file batch events.
//!
//! Pass an implementation of [`BatchProgressCallback`] to
//! [`crate::clean_directory`] or [`crate::convert_videos`] to be told when
//! each file starts and finishes. The CLI uses it to drive an `indicatif`
//! progress bar; library callers can forward events anywhere.
//!
//! Progress is advisory: nothing in the pipelines depends on what a callback
//! does.
//!
//! # Example
//!
//! ```rust
//! use pdfsift::{BatchProgressCallback, FileOutcome};
//! use std::path::Path;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Counter(AtomicUsize);
//!
//! impl BatchProgressCallback for Counter {
//!     fn on_file_complete(&self, _index: usize, _total: usize, _path: &Path, _outcome: &FileOutcome) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Counter(AtomicUsize::new(0));
//! counter.on_file_complete(1, 1, Path::new("a.pdf"), &FileOutcome::Skipped { reason: "empty".into() });
//! assert_eq!(counter.0.load(Ordering::SeqCst), 1);
//! ```

use crate::output::{BatchReport, FileOutcome};
use std::path::Path;
use std::sync::Arc;

/// Called by the batch drivers as they work through the file list.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after scanning, before any file is processed.
    ///
    /// # Arguments
    /// * `total_files`: number of files that will be processed
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is processed.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in the batch
    /// * `total`: total files in the batch
    /// * `path`: the file about to be processed
    fn on_file_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called after a file is processed, whatever the outcome.
    fn on_file_complete(&self, index: usize, total: usize, path: &Path, outcome: &FileOutcome) {
        let _ = (index, total, path, outcome);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, report: &BatchReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Shared callback handle accepted by the batch drivers.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
