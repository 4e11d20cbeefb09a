//! Input validation: make sure a discovered path is a readable PDF.
//!
//! pdfium and lopdf both produce opaque parse errors on non-PDF input, so the
//! `%PDF` magic bytes are checked up front. A renamed ZIP or an empty
//! placeholder file then surfaces as [`SiftError::NotAPdf`] with the bytes
//! that were actually found.

use crate::error::SiftError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Check that `path` exists, is readable, and starts with `%PDF`.
pub fn validate_pdf(path: &Path) -> Result<(), SiftError> {
    if !path.exists() {
        return Err(SiftError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SiftError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(SiftError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut magic = [0u8; 4];
    let mut read = 0;
    while read < magic.len() {
        match file.read(&mut magic[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    if &magic != b"%PDF" {
        return Err(SiftError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    debug!("Validated PDF: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("ok.pdf");
        std::fs::write(&p, b"%PDF-1.7\n...").unwrap();
        assert!(validate_pdf(&p).is_ok());
    }

    #[test]
    fn rejects_other_magic() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("zip.pdf");
        std::fs::write(&p, b"PK\x03\x04rest").unwrap();
        match validate_pdf(&p) {
            Err(SiftError::NotAPdf { magic, .. }) => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("short.pdf");
        std::fs::write(&p, b"%P").unwrap();
        assert!(matches!(validate_pdf(&p), Err(SiftError::NotAPdf { .. })));
    }

    #[test]
    fn missing_file() {
        let err = validate_pdf(Path::new("/definitely/not/a/real/file.pdf")).unwrap_err();
        assert!(matches!(err, SiftError::FileNotFound { .. }));
    }
}
