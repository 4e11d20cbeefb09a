//! Pipeline stages for duplicate-page removal and video screenshots.
//!
//! Each submodule implements one step and can be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! PDFs:   scan ──▶ input ──▶ render ──▶ hash ──▶ dedup ──▶ filter
//! Videos: scan ──▶ frames ──▶ assemble
//! ```
//!
//! 1. [`scan`]     recursive suffix match under the batch root
//! 2. [`input`]    cheap checks before pdfium sees a file (exists, `%PDF`)
//! 3. [`render`]   rasterise pages one by one in grayscale via pdfium
//! 4. [`hash`]     resize and gradient-hash a page render
//! 5. [`dedup`]    streaming keep/delete decisions against the last kept page
//! 6. [`filter`]   rebuild the PDF without the deleted pages (lopdf)
//! 7. [`frames`]   decode a video and keep one frame every N seconds (ffmpeg)
//! 8. [`assemble`] bind frame images into a PDF, one per page (lopdf)

pub mod assemble;
pub mod dedup;
pub mod filter;
pub mod frames;
pub mod hash;
pub mod input;
pub mod render;
pub mod scan;
