//! Page removal: rebuild a PDF without the pages marked for deletion.
//!
//! The source is loaded with lopdf, the unwanted page objects are detached
//! from the page tree, and orphaned objects are pruned. Retained pages keep
//! their content streams byte-for-byte: nothing is re-rendered and streams
//! are not recompressed.
//!
//! The result is written to a `.tmp` sibling and renamed into place so an
//! interrupted run never leaves a half-written `_cleaned.pdf` behind.

use crate::error::SiftError;
use lopdf::Document;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `<dir>/<stem><suffix>.pdf` for `<dir>/<stem>.pdf`.
pub fn cleaned_path(pdf_path: &Path, suffix: &str) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    pdf_path.with_file_name(format!("{stem}{suffix}.pdf"))
}

/// Remove `delete` (1-indexed page numbers) from `doc` in place.
///
/// Numbers outside the document are ignored.
///
/// # Returns
/// The number of pages left.
pub fn remove_pages(doc: &mut Document, delete: &[usize]) -> usize {
    let page_count = doc.get_pages().len();
    let targets: BTreeSet<u32> = delete
        .iter()
        .filter(|&&p| p >= 1 && p <= page_count)
        .map(|&p| p as u32)
        .collect();

    // Delete back to front so remaining page numbers stay valid.
    for page_num in targets.iter().rev() {
        doc.delete_pages(&[*page_num]);
    }
    if !targets.is_empty() {
        doc.prune_objects();
    }

    doc.get_pages().len()
}

/// Write a copy of `pdf_path` without the `delete` pages to `output_path`.
///
/// `expected_pages` is the page count the delete set was computed against.
/// lopdf must see the same number of pages, otherwise page numbers would
/// point at different pages and nothing is written.
///
/// The original is only ever opened for reading.
///
/// # Returns
/// The number of pages written.
pub fn write_without_pages(
    pdf_path: &Path,
    delete: &[usize],
    expected_pages: usize,
    output_path: &Path,
) -> Result<usize, SiftError> {
    let mut doc = Document::load(pdf_path).map_err(|e| SiftError::CorruptPdf {
        path: pdf_path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let before = doc.get_pages().len();
    if before != expected_pages {
        return Err(SiftError::PageEditFailed {
            path: pdf_path.to_path_buf(),
            detail: format!(
                "page tree has {before} pages but {expected_pages} were rendered"
            ),
        });
    }
    let remaining = remove_pages(&mut doc, delete);
    debug!(
        "{}: {} → {} pages",
        pdf_path.display(),
        before,
        remaining
    );

    if remaining == 0 {
        return Err(SiftError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }

    save_atomic(&mut doc, output_path)?;
    info!("Wrote {} ({} pages)", output_path.display(), remaining);
    Ok(remaining)
}

/// Serialise `doc` to `<path>.tmp`, then rename over `path`.
pub(crate) fn save_atomic(doc: &mut Document, path: &Path) -> Result<(), SiftError> {
    let tmp_path = path.with_extension("pdf.tmp");

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| SiftError::PageEditFailed {
            path: path.to_path_buf(),
            detail: format!("Save failed: {}", e),
        })?;

    std::fs::write(&tmp_path, &buffer).map_err(|e| SiftError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        SiftError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};

    /// A PDF with `num_pages` pages, each showing "Page N".
    pub fn create_test_pdf(num_pages: u32) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut page_ids = Vec::new();

        for i in 0..num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                    Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("Page {}", i + 1).into_bytes(),
                            lopdf::StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(612),
                        Object::Integer(792),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
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
        doc
    }

    /// Raw content-stream bytes of every page, in page order.
    pub fn page_contents(doc: &Document) -> Vec<Vec<u8>> {
        doc.get_pages()
            .values()
            .map(|id| doc.get_page_content(*id).unwrap())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_fixture(dir: &Path, name: &str, pages: u32) -> PathBuf {
        let path = dir.join(name);
        create_test_pdf(pages).save(&path).unwrap();
        path
    }

    #[test]
    fn cleaned_path_is_sibling_with_suffix() {
        assert_eq!(
            cleaned_path(Path::new("/docs/week1/lecture.pdf"), "_cleaned"),
            PathBuf::from("/docs/week1/lecture_cleaned.pdf")
        );
        assert_eq!(
            cleaned_path(Path::new("slides.v2.pdf"), "_cleaned"),
            PathBuf::from("slides.v2_cleaned.pdf")
        );
    }

    #[test]
    fn removes_selected_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "deck.pdf", 5);
        let out = dir.path().join("deck_cleaned.pdf");

        let original = page_contents(&Document::load(&src).unwrap());
        let written = write_without_pages(&src, &[2, 3], 5, &out).unwrap();
        assert_eq!(written, 3);

        let cleaned = Document::load(&out).unwrap();
        assert_eq!(cleaned.get_pages().len(), 3);
        assert_eq!(
            page_contents(&cleaned),
            vec![original[0].clone(), original[3].clone(), original[4].clone()]
        );
    }

    #[test]
    fn page_count_invariant_holds() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "deck.pdf", 8);
        let out = dir.path().join("out.pdf");
        let delete = [2, 4, 5, 8];
        let written = write_without_pages(&src, &delete, 8, &out).unwrap();
        assert_eq!(written, 8 - delete.len());
    }

    #[test]
    fn empty_delete_set_copies_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "deck.pdf", 3);
        let out = dir.path().join("copy.pdf");
        let original = page_contents(&Document::load(&src).unwrap());
        assert_eq!(write_without_pages(&src, &[], 3, &out).unwrap(), 3);
        assert_eq!(page_contents(&Document::load(&out).unwrap()), original);
    }

    #[test]
    fn original_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "deck.pdf", 4);
        let before = std::fs::read(&src).unwrap();
        write_without_pages(&src, &[2], 4, &dir.path().join("out.pdf")).unwrap();
        assert_eq!(std::fs::read(&src).unwrap(), before);
    }

    #[test]
    fn out_of_range_numbers_are_ignored() {
        let mut doc = create_test_pdf(3);
        assert_eq!(remove_pages(&mut doc, &[0, 7, 2]), 2);
    }

    #[test]
    fn deleting_every_page_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "deck.pdf", 2);
        let out = dir.path().join("out.pdf");
        let err = write_without_pages(&src, &[1, 2], 2, &out).unwrap_err();
        assert!(matches!(err, SiftError::EmptyDocument { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn no_tmp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "deck.pdf", 2);
        let out = dir.path().join("out.pdf");
        write_without_pages(&src, &[2], 2, &out).unwrap();
        assert!(!dir.path().join("out.pdf.tmp").exists());
    }

    #[test]
    fn page_count_mismatch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path(), "deck.pdf", 4);
        let out = dir.path().join("out.pdf");
        let err = write_without_pages(&src, &[2], 5, &out).unwrap_err();
        assert!(matches!(err, SiftError::PageEditFailed { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn corrupt_source_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bad.pdf");
        std::fs::write(&src, b"%PDF-1.7\ngarbage").unwrap();
        let err = write_without_pages(&src, &[], 1, &dir.path().join("out.pdf")).unwrap_err();
        assert!(matches!(err, SiftError::CorruptPdf { .. }));
    }
}
