//! # pdfsift
//!
//! Remove near-duplicate pages from lecture PDFs, and turn lecture videos
//! into PDFs of periodic screenshots.
//!
//! ## Why this crate?
//!
//! Slide decks exported with animation builds contain runs of pages that
//! differ only by one bullet point appearing. Reading or printing them means
//! paging through the same slide over and over. `pdfsift` renders each page,
//! computes a perceptual hash, and drops every page that is too similar to
//! the last page it kept. The retained pages are copied from the source PDF
//! untouched.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Scan     find *.pdf under the root (skipping *_cleaned.pdf)
//!  ├─ 2. Render   rasterise each page in grayscale via pdfium
//!  ├─ 3. Hash     100×100 resize, 8×8 gradient hash
//!  ├─ 4. Dedup    Hamming distance to the last kept page vs. threshold
//!  └─ 5. Filter   write <stem>_cleaned.pdf without the duplicates
//!
//! MP4
//!  │
//!  ├─ 1. Frames   decode with ffmpeg, keep one frame every N seconds
//!  └─ 2. Assemble one stretched full-page image per page → <stem>.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfsift::{clean_directory, CleanConfig};
//! use std::path::Path;
//!
//! let config = CleanConfig::builder().threshold(90.0).build()?;
//! let report = clean_directory(Path::new("lectures"), &config, None)?;
//! eprintln!(
//!     "{} PDFs cleaned, {} pages removed",
//!     report.succeeded(),
//!     report.pages_removed()
//! );
//! # Ok::<(), pdfsift::SiftError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsift` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `video` | on      | Frame extraction through `ffmpeg-next` (needs FFmpeg libraries) |
//!
//! Without `video`, [`convert_videos`] still scans but reports every video as
//! skipped.
//!
//! ## Choosing a Threshold
//!
//! The cutoff is `(1 - threshold / 100) × 64` bits. A page whose hash differs
//! from the last kept page by fewer bits is deleted.
//!
//! | Threshold | Cutoff | Effect |
//! |-----------|--------|--------|
//! | 100 | 0 bits | Nothing is ever deleted |
//! | 95  | 3.2 bits | Only near-identical pages |
//! | 90  | 6.4 bits | Default: animation builds collapse |
//! | 80  | 12.8 bits | Aggressive, may merge distinct slides |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod clean;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod video;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use clean::{clean_directory, clean_pdf, find_duplicate_pages, PdfCleaner};
pub use config::{CleanConfig, CleanConfigBuilder, PageSize, VideoConfig, VideoConfigBuilder};
pub use error::SiftError;
pub use output::{BatchReport, CleanSummary, FileOutcome, FileReport, VideoSummary};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use video::{convert_videos, video_to_pdf};
