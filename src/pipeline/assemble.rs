//! PDF assembly: one full-page image per page.
//!
//! Each image becomes an image XObject drawn with a single `cm` that maps the
//! unit square onto the whole page, so images are stretched to the page size
//! regardless of their aspect ratio.
//!
//! JPEG inputs are embedded as-is with `/Filter /DCTDecode`; the PDF viewer
//! decodes them, so frames are never decoded and re-encoded on the way in.
//! Anything else (PNG, grayscale with alpha, …) is decoded and re-encoded as
//! JPEG first.

use crate::config::PageSize;
use crate::error::SiftError;
use crate::pipeline::filter::save_atomic;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// JPEG quality used when a non-JPEG input has to be re-encoded.
const REENCODE_QUALITY: u8 = 90;

/// An image ready to be written as a PDF image XObject.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub grayscale: bool,
}

/// Build a PDF at `output` with one stretched full-page image per entry.
///
/// # Errors
/// [`SiftError::NoFrames`] for an empty list (no file is created);
/// [`SiftError::ImageReadFailed`] if an input cannot be read.
///
/// # Returns
/// The number of pages written.
pub fn assemble_pdf(
    images: &[PathBuf],
    output: &Path,
    page_size: PageSize,
) -> Result<usize, SiftError> {
    if images.is_empty() {
        return Err(SiftError::NoFrames {
            path: output.to_path_buf(),
        });
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut page_ids = Vec::with_capacity(images.len());

    for path in images {
        let embedded = load_image(path)?;
        let page_id = add_image_page(&mut doc, pages_id, &embedded, page_size).map_err(|e| {
            SiftError::PageEditFailed {
                path: output.to_path_buf(),
                detail: e.to_string(),
            }
        })?;
        debug!(
            "Added {} ({}x{}) as page {}",
            path.display(),
            embedded.width,
            embedded.height,
            page_ids.len() + 1
        );
        page_ids.push(page_id);
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    save_atomic(&mut doc, output)?;
    info!("Assembled {} ({} pages)", output.display(), page_ids.len());
    Ok(page_ids.len())
}

/// Read an image file as embeddable JPEG data.
pub fn load_image(path: &Path) -> Result<EmbeddedImage, SiftError> {
    let read_err = |detail: String| SiftError::ImageReadFailed {
        path: path.to_path_buf(),
        detail,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| read_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| read_err(e.to_string()))?;

    if reader.format() == Some(ImageFormat::Jpeg) {
        let decoder = reader.into_decoder().map_err(|e| read_err(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        let grayscale = match decoder.color_type() {
            ColorType::L8 => Some(true),
            ColorType::Rgb8 => Some(false),
            _ => None,
        };
        if let Some(grayscale) = grayscale {
            let jpeg = std::fs::read(path).map_err(|e| read_err(e.to_string()))?;
            return Ok(EmbeddedImage {
                jpeg,
                width,
                height,
                grayscale,
            });
        }
    }

    let img = image::open(path).map_err(|e| read_err(e.to_string()))?;
    let jpeg = encode_jpeg(&img, REENCODE_QUALITY).map_err(|e| read_err(e.to_string()))?;
    Ok(EmbeddedImage {
        jpeg,
        width: img.width(),
        height: img.height(),
        grayscale: false,
    })
}

/// Encode an image as baseline RGB JPEG bytes.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)?;
    debug!("Encoded image → {} bytes JPEG", buf.len());
    Ok(buf)
}

fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    image: &EmbeddedImage,
    page_size: PageSize,
) -> Result<ObjectId, lopdf::Error> {
    let (page_w, page_h) = page_size.points();

    let color_space: &[u8] = if image.grayscale {
        b"DeviceGray"
    } else {
        b"DeviceRGB"
    };
    let image_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(i64::from(image.width))),
        ("Height", Object::Integer(i64::from(image.height))),
        ("ColorSpace", Object::Name(color_space.to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"DCTDecode".to_vec())),
    ]);
    let image_id =
        doc.add_object(Stream::new(image_dict, image.jpeg.clone()).with_compression(false));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(page_w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(page_h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(page_w),
                Object::Integer(page_h),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]);
    Ok(doc.add_object(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_jpeg(dir: &Path, name: &str, w: u32, h: u32, shade: u8) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb([shade, 255 - shade, 40]))
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();
        path
    }

    fn image_streams(doc: &Document) -> Vec<&Stream> {
        doc.objects
            .values()
            .filter_map(|o| match o {
                Object::Stream(s)
                    if s.dict.get(b"Subtype").and_then(|v| v.as_name()).ok()
                        == Some(b"Image".as_slice()) =>
                {
                    Some(s)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn one_page_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let frames: Vec<_> = (0..5)
            .map(|i| write_jpeg(dir.path(), &format!("f{i}.jpg"), 64, 36, i * 40))
            .collect();
        let out = dir.path().join("clip.pdf");

        assert_eq!(assemble_pdf(&frames, &out, PageSize::Letter).unwrap(), 5);

        let doc = Document::load(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
        assert_eq!(image_streams(&doc).len(), 5);
    }

    #[test]
    fn pages_use_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![write_jpeg(dir.path(), "f.jpg", 32, 32, 0)];
        let out = dir.path().join("a4.pdf");
        assemble_pdf(&frames, &out, PageSize::A4).unwrap();

        let doc = Document::load(&out).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let media_box: Vec<i64> = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_i64().unwrap())
            .collect();
        assert_eq!(media_box, vec![0, 0, 595, 842]);
    }

    #[test]
    fn jpeg_bytes_are_embedded_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let frame = write_jpeg(dir.path(), "f.jpg", 48, 27, 200);
        let original = std::fs::read(&frame).unwrap();
        let out = dir.path().join("clip.pdf");
        assemble_pdf(&[frame], &out, PageSize::Letter).unwrap();

        let doc = Document::load(&out).unwrap();
        let streams = image_streams(&doc);
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].content, original);
        assert_eq!(
            streams[0].dict.get(b"Width").unwrap().as_i64().unwrap(),
            48
        );
    }

    #[test]
    fn png_inputs_are_reencoded_as_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("f.png");
        RgbImage::from_pixel(20, 10, Rgb([1, 2, 3])).save(&png).unwrap();

        let embedded = load_image(&png).unwrap();
        assert_eq!((embedded.width, embedded.height), (20, 10));
        assert!(!embedded.grayscale);
        let decoded = image::load_from_memory_with_format(&embedded.jpeg, ImageFormat::Jpeg).unwrap();
        assert_eq!(decoded.width(), 20);
    }

    #[test]
    fn grayscale_jpeg_uses_device_gray() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.jpg");
        image::GrayImage::from_pixel(8, 8, image::Luma([90]))
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();
        assert!(load_image(&path).unwrap().grayscale);
    }

    #[test]
    fn empty_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("none.pdf");
        let err = assemble_pdf(&[], &out, PageSize::Letter).unwrap_err();
        assert!(matches!(err, SiftError::NoFrames { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn unreadable_image_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.jpg");
        std::fs::write(&bogus, b"nope").unwrap();
        let err = assemble_pdf(&[bogus], &dir.path().join("o.pdf"), PageSize::Letter).unwrap_err();
        assert!(matches!(err, SiftError::ImageReadFailed { .. }));
    }
}
