//! Result types returned by the pipelines.
//!
//! A batch never fails because one file did: every input ends up as a
//! [`FileReport`] whose [`FileOutcome`] says whether an artifact was written,
//! the file was skipped, or processing failed (with the error message).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one PDF in the cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanSummary {
    /// Source document.
    pub source: PathBuf,
    /// Output path; `None` on a dry run.
    pub output: Option<PathBuf>,
    /// Pages in the source.
    pub pages_in: usize,
    /// 1-indexed pages removed, in document order.
    pub deleted_pages: Vec<usize>,
}

impl CleanSummary {
    /// Pages in the output: `pages_in - deleted_pages.len()`.
    pub fn pages_out(&self) -> usize {
        self.pages_in.saturating_sub(self.deleted_pages.len())
    }
}

/// What happened to one video in the screenshot pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Number of frames captured, which is also the PDF page count.
    pub frames: usize,
}

/// Per-file result inside a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Cleaned(CleanSummary),
    Converted(VideoSummary),
    /// Readable input with nothing to produce (no frames, no pages).
    Skipped { reason: String },
    /// Processing failed; the batch moved on.
    Failed { error: String },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, FileOutcome::Skipped { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub duration_ms: u64,
}

/// Everything a batch did, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub root: PathBuf,
    pub files: Vec<FileReport>,
    pub total_duration_ms: u64,
}

impl BatchReport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn succeeded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !f.outcome.is_failure() && !f.outcome.is_skip())
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_skip()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_failure()).count()
    }

    /// Total pages removed across all cleaned documents.
    pub fn pages_removed(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| match &f.outcome {
                FileOutcome::Cleaned(s) => Some(s.deleted_pages.len()),
                _ => None,
            })
            .sum()
    }
}
