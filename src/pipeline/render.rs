//! PDF rasterisation: render pages to grayscale `DynamicImage`s via pdfium.
//!
//! Pages are rendered one at a time and handed to a callback, so a
//! 500-page document never holds more than one bitmap in memory. The
//! rasterisation DPI is only a speed/fidelity knob for hashing; the image is
//! downscaled again by [`crate::pipeline::hash::PageHasher`].

use crate::error::SiftError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Longest edge, in pixels, pdfium may allocate for one page.
const MAX_RENDER_EDGE: i32 = 4000;

/// Environment variable naming a directory that contains the pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium: `PDFIUM_LIB_PATH` first, then the system library path.
pub fn bind_pdfium() -> Result<Pdfium, SiftError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let lib = Pdfium::pdfium_platform_library_name_at_path(&PathBuf::from(&dir));
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
                .map_err(|e| SiftError::PdfiumBindingFailed(format!("{}: {:?}", lib.display(), e)))?
        }
        _ => Pdfium::bind_to_system_library()
            .map_err(|e| SiftError::PdfiumBindingFailed(format!("{:?}", e)))?,
    };
    Ok(Pdfium::new(bindings))
}

/// Open a PDF, mapping pdfium's load errors onto [`SiftError`].
pub fn open_document<'a>(pdfium: &'a Pdfium, pdf_path: &Path) -> Result<PdfDocument<'a>, SiftError> {
    pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            SiftError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        } else {
            SiftError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Render every page of `pdf_path` in order and pass it to `on_page`.
///
/// `on_page` receives the 1-indexed page number and the grayscale render.
/// Any page failure aborts the whole document.
///
/// # Returns
/// The number of pages rendered.
pub fn render_pages<F>(
    pdfium: &Pdfium,
    pdf_path: &Path,
    dpi: u32,
    mut on_page: F,
) -> Result<usize, SiftError>
where
    F: FnMut(usize, DynamicImage),
{
    let document = open_document(pdfium, pdf_path)?;
    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages ({})", total_pages, pdf_path.display());

    let render_config = page_render_config(dpi);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| SiftError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        on_page(idx + 1, image);
    }

    Ok(total_pages)
}

/// Number of pages, without rendering anything.
pub fn page_count(pdfium: &Pdfium, pdf_path: &Path) -> Result<usize, SiftError> {
    let document = open_document(pdfium, pdf_path)?;
    Ok(document.pages().len() as usize)
}

fn page_render_config(dpi: u32) -> PdfRenderConfig {
    PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / 72.0)
        .set_maximum_width(MAX_RENDER_EDGE)
        .set_maximum_height(MAX_RENDER_EDGE)
        .use_grayscale_rendering(true)
}
