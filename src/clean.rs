//! Duplicate-page removal for single PDFs and whole directory trees.
//!
//! ```text
//! scan ──▶ validate ──▶ render ──▶ hash ──▶ dedup ──▶ filter
//!          (%PDF)      (pdfium)  (dHash)  (stream)  (lopdf)
//! ```
//!
//! Pages are rendered one at a time and hashed immediately, so memory stays
//! flat regardless of document length. The delete set is decided in a
//! single forward pass before the document is touched; the output is then
//! rebuilt from the source objects, never from the renders.

use crate::config::{CleanConfig, CLEANED_SUFFIX};
use crate::error::SiftError;
use crate::output::{BatchReport, CleanSummary, FileOutcome, FileReport};
use crate::pipeline::dedup::DuplicateDetector;
use crate::pipeline::filter::{cleaned_path, write_without_pages};
use crate::pipeline::hash::PageHasher;
use crate::pipeline::input::validate_pdf;
use crate::pipeline::render::{bind_pdfium, render_pages};
use crate::pipeline::scan::{find_files, has_suffix, PDF_SUFFIX};
use crate::progress::ProgressCallback;
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// A bound pdfium library plus the settings to clean with.
///
/// Binding pdfium is comparatively expensive, so batch runs create one
/// cleaner and reuse it for every document.
pub struct PdfCleaner {
    pdfium: Pdfium,
    config: CleanConfig,
    hasher: PageHasher,
}

impl PdfCleaner {
    /// Bind pdfium and prepare a hasher for `config`.
    ///
    /// # Errors
    /// [`SiftError::PdfiumBindingFailed`] when no pdfium library is found.
    pub fn new(config: CleanConfig) -> Result<Self, SiftError> {
        let pdfium = bind_pdfium()?;
        Ok(Self::with_pdfium(pdfium, config))
    }

    /// Use an already bound pdfium instance.
    pub fn with_pdfium(pdfium: Pdfium, config: CleanConfig) -> Self {
        let hasher = PageHasher::from_config(&config);
        Self {
            pdfium,
            config,
            hasher,
        }
    }

    pub fn config(&self) -> &CleanConfig {
        &self.config
    }

    /// Compute the 1-indexed pages of `pdf_path` that duplicate the page
    /// kept before them.
    ///
    /// # Returns
    /// `(pages_in, delete_set)`.
    pub fn find_duplicate_pages(&self, pdf_path: &Path) -> Result<(usize, Vec<usize>), SiftError> {
        validate_pdf(pdf_path)?;

        let mut detector = DuplicateDetector::new(self.config.threshold);
        let pages = render_pages(&self.pdfium, pdf_path, self.config.dpi, |page_num, image| {
            let hash = self.hasher.hash_page(&image);
            let decision = detector.observe(hash);
            debug!("Page {}: {:?}", page_num, decision);
        })?;

        Ok((pages, detector.into_deleted()))
    }

    /// Write `<stem><suffix>.pdf` next to `pdf_path` without its duplicate
    /// pages. On a dry run the delete set is computed and nothing is written.
    pub fn clean_pdf(&self, pdf_path: &Path) -> Result<CleanSummary, SiftError> {
        let (pages_in, deleted_pages) = self.find_duplicate_pages(pdf_path)?;
        info!(
            "{}: {} of {} pages are duplicates {:?}",
            pdf_path.display(),
            deleted_pages.len(),
            pages_in,
            deleted_pages
        );

        let output = if self.config.dry_run {
            None
        } else {
            let out = cleaned_path(pdf_path, &self.config.output_suffix);
            write_without_pages(pdf_path, &deleted_pages, pages_in, &out)?;
            Some(out)
        };

        Ok(CleanSummary {
            source: pdf_path.to_path_buf(),
            output,
            pages_in,
            deleted_pages,
        })
    }
}

/// Delete set for one PDF, binding pdfium for this call only.
pub fn find_duplicate_pages(pdf_path: &Path, config: &CleanConfig) -> Result<Vec<usize>, SiftError> {
    let cleaner = PdfCleaner::new(config.clone())?;
    cleaner.find_duplicate_pages(pdf_path).map(|(_, deleted)| deleted)
}

/// Clean one PDF, binding pdfium for this call only.
pub fn clean_pdf(pdf_path: &Path, config: &CleanConfig) -> Result<CleanSummary, SiftError> {
    PdfCleaner::new(config.clone())?.clean_pdf(pdf_path)
}

/// PDFs under `root` that should be cleaned, in scan order.
///
/// Earlier outputs (`*_cleaned.pdf`, or whatever suffix is configured) are
/// left out unless `include_cleaned` is set.
pub fn collect_pdfs(root: &Path, config: &CleanConfig) -> Result<Vec<PathBuf>, SiftError> {
    let mut files = find_files(root, PDF_SUFFIX)?;
    if !config.include_cleaned {
        files.retain(|p| {
            let excluded = is_cleaned_output(p, &config.output_suffix);
            if excluded {
                info!(
                    "Ignoring {} (looks like an earlier output; use --include-cleaned to process it)",
                    p.display()
                );
            }
            !excluded
        });
    }
    Ok(files)
}

fn is_cleaned_output(path: &Path, suffix: &str) -> bool {
    let suffix = if suffix.is_empty() { CLEANED_SUFFIX } else { suffix };
    has_suffix(path, &format!("{suffix}{PDF_SUFFIX}"))
}

/// Clean every PDF under `root`.
///
/// A file that cannot be processed is logged and recorded in the report;
/// the batch always continues with the next file.
///
/// # Errors
/// Only batch-level failures: a missing or non-directory root, or no
/// pdfium library when there is at least one PDF to process.
pub fn clean_directory(
    root: &Path,
    config: &CleanConfig,
    progress: Option<ProgressCallback>,
) -> Result<BatchReport, SiftError> {
    let batch_start = Instant::now();
    let files = collect_pdfs(root, config)?;
    info!("Found {} PDF(s) under {}", files.len(), root.display());

    let mut report = BatchReport::new(root);
    if let Some(cb) = &progress {
        cb.on_batch_start(files.len());
    }

    if !files.is_empty() {
        let cleaner = PdfCleaner::new(config.clone())?;
        let total = files.len();
        for (idx, path) in files.iter().enumerate() {
            if let Some(cb) = &progress {
                cb.on_file_start(idx + 1, total, path);
            }
            let file_start = Instant::now();
            let outcome = match cleaner.clean_pdf(path) {
                Ok(summary) => FileOutcome::Cleaned(summary),
                Err(e) => outcome_for_error(path, e),
            };
            if let Some(cb) = &progress {
                cb.on_file_complete(idx + 1, total, path, &outcome);
            }
            report.files.push(FileReport {
                path: path.clone(),
                outcome,
                duration_ms: file_start.elapsed().as_millis() as u64,
            });
        }
    }

    report.total_duration_ms = batch_start.elapsed().as_millis() as u64;
    info!(
        "Cleaned {} of {} PDF(s), {} page(s) removed, {} failed, in {}ms",
        report.succeeded(),
        report.total(),
        report.pages_removed(),
        report.failed(),
        report.total_duration_ms
    );
    if let Some(cb) = &progress {
        cb.on_batch_complete(&report);
    }
    Ok(report)
}

/// Map a per-file error to its report outcome, logging it on the way.
pub(crate) fn outcome_for_error(path: &Path, err: SiftError) -> FileOutcome {
    if err.is_skip() {
        info!("Skipping {}: {}", path.display(), err);
        FileOutcome::Skipped {
            reason: err.to_string(),
        }
    } else {
        warn!("Failed to process {}: {}", path.display(), err);
        FileOutcome::Failed {
            error: err.to_string(),
        }
    }
}
