//! Error types for the pdfsift library.
//!
//! Everything that can go wrong is a [`SiftError`], but the variants fall
//! into two tiers:
//!
//! * **Batch-level**: the batch cannot start at all (missing root directory,
//!   pdfium not loadable, invalid configuration). Returned as `Err` from
//!   [`crate::clean_directory`] and [`crate::convert_videos`].
//!
//! * **File-level**: one input failed (corrupt PDF, unreadable video, disk
//!   full on write). The batch entry points catch these, record them in a
//!   [`crate::output::FileReport`], log them, and move on to the next file.
//!
//! [`SiftError::is_skip`] separates "nothing to produce" outcomes (no frames,
//! empty document) from genuine failures.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdfsift library.
#[derive(Debug, Error)]
pub enum SiftError {
    // ── Batch errors ──────────────────────────────────────────────────────
    /// The root directory handed to a batch does not exist.
    #[error("Root directory not found: '{path}'")]
    RootNotFound { path: PathBuf },

    /// The root path exists but is a file.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium, or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password; encrypted documents are skipped.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// lopdf could not remove pages or serialise the result.
    #[error("Failed to rebuild '{path}': {detail}")]
    PageEditFailed { path: PathBuf, detail: String },

    /// Every page would be removed, or the document has no pages.
    #[error("'{path}' has no pages to write")]
    EmptyDocument { path: PathBuf },

    // ── Video errors ──────────────────────────────────────────────────────
    /// FFmpeg could not open or probe the container.
    #[error("Failed to open video '{path}': {detail}")]
    VideoOpenFailed { path: PathBuf, detail: String },

    /// The container has no video stream.
    #[error("No video stream in '{path}'")]
    NoVideoStream { path: PathBuf },

    /// The stream reports a frame rate that truncates to zero frames per second.
    #[error("Unusable frame rate {fps:.3} in '{path}'")]
    FrameRateUnavailable { path: PathBuf, fps: f64 },

    /// Decoding or pixel conversion failed mid-stream.
    #[error("Failed to decode frames from '{path}': {detail}")]
    FrameDecodeFailed { path: PathBuf, detail: String },

    /// A sampled frame could not be written as JPEG.
    #[error("Failed to write frame '{path}': {detail}")]
    FrameWriteFailed { path: PathBuf, detail: String },

    /// The crate was built without the `video` feature.
    #[error("Video support is disabled; rebuild with `--features video` to process '{path}'")]
    VideoSupportDisabled { path: PathBuf },

    /// No frames were sampled, so there is nothing to assemble.
    #[error("No frames extracted from '{path}'")]
    NoFrames { path: PathBuf },

    /// An image handed to the assembler could not be read or re-encoded.
    #[error("Failed to read image '{path}': {detail}")]
    ImageReadFailed { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the per-video scratch directory.
    #[error("Failed to create temporary directory under '{path}': {source}")]
    TempDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SiftError {
    /// True for outcomes where the input was readable but produced nothing
    /// worth writing. These are reported as skips rather than failures.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            SiftError::NoFrames { .. }
                | SiftError::EmptyDocument { .. }
                | SiftError::VideoSupportDisabled { .. }
        )
    }

    /// True for errors that stop a whole batch rather than a single file.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            SiftError::RootNotFound { .. }
                | SiftError::NotADirectory { .. }
                | SiftError::InvalidConfig(_)
                | SiftError::PdfiumBindingFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_pdf_display_shows_magic() {
        let e = SiftError::NotAPdf {
            path: PathBuf::from("/tmp/x.pdf"),
            magic: *b"PK\x03\x04",
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/x.pdf"), "got: {msg}");
        assert!(msg.contains("80"), "got: {msg}");
    }

    #[test]
    fn rasterisation_display() {
        let e = SiftError::RasterisationFailed {
            page: 3,
            detail: "bad xref".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("bad xref"));
    }

    #[test]
    fn skip_classification() {
        assert!(SiftError::NoFrames {
            path: PathBuf::from("a.mp4")
        }
        .is_skip());
        assert!(SiftError::EmptyDocument {
            path: PathBuf::from("a.pdf")
        }
        .is_skip());
        assert!(!SiftError::CorruptPdf {
            path: PathBuf::from("a.pdf"),
            detail: String::new()
        }
        .is_skip());
    }

    #[test]
    fn batch_fatal_classification() {
        assert!(SiftError::RootNotFound {
            path: PathBuf::from("/nope")
        }
        .is_batch_fatal());
        assert!(SiftError::PdfiumBindingFailed("missing".into()).is_batch_fatal());
        assert!(!SiftError::NoVideoStream {
            path: PathBuf::from("a.mp4")
        }
        .is_batch_fatal());
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = SiftError::OutputWriteFailed {
            path: PathBuf::from("out.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("out.pdf"));
    }
}
