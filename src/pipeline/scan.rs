//! Directory scanning: recursively collect files by file-name suffix.
//!
//! The match is a case-sensitive `ends_with` on the file name, so
//! `lecture.pdf` matches `.pdf` but `LECTURE.PDF` does not. Results come back
//! in traversal order, which is filesystem-dependent; callers use the order
//! for progress reporting only.

use crate::error::SiftError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix of files picked up by the PDF cleaner.
pub const PDF_SUFFIX: &str = ".pdf";

/// Suffix of files picked up by the video converter.
pub const VIDEO_SUFFIX: &str = ".mp4";

/// Recursively find every file under `root` whose name ends with `suffix`.
///
/// # Errors
/// Fails only when `root` itself is missing or is not a directory.
/// Subdirectories that cannot be read are logged and skipped.
pub fn find_files(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, SiftError> {
    if !root.exists() {
        return Err(SiftError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(SiftError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };

        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                subdirs.push(path);
            } else if has_suffix(&path, suffix) && path.is_file() {
                found.push(path);
            }
        }
        // Reverse so the stack pops subdirectories in the order they were read.
        pending.extend(subdirs.into_iter().rev());
    }

    debug!(
        "Found {} '{}' files under {}",
        found.len(),
        suffix,
        root.display()
    );
    Ok(found)
}

/// Case-sensitive file-name suffix test.
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files = find_files(dir.path(), PDF_SUFFIX).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn finds_nested_files_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub/b.pdf"));
        touch(&dir.path().join("sub/deeper/c.pdf"));
        touch(&dir.path().join("sub/deeper/clip.mp4"));

        let mut files = find_files(dir.path(), PDF_SUFFIX).unwrap();
        files.sort();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("sub/b.pdf"),
                PathBuf::from("sub/deeper/c.pdf"),
            ]
        );

        let videos = find_files(dir.path(), VIDEO_SUFFIX).unwrap();
        assert_eq!(videos.len(), 1);
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("UPPER.PDF"));
        touch(&dir.path().join("lower.pdf"));
        let files = find_files(dir.path(), PDF_SUFFIX).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("lower.pdf"));
    }

    #[test]
    fn directory_named_like_a_pdf_is_not_a_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("folder.pdf")).unwrap();
        touch(&dir.path().join("folder.pdf/inner.pdf"));
        let files = find_files(dir.path(), PDF_SUFFIX).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("inner.pdf"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = find_files(Path::new("/definitely/not/here"), PDF_SUFFIX).unwrap_err();
        assert!(matches!(err, SiftError::RootNotFound { .. }));
    }

    #[test]
    fn file_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        touch(&file);
        let err = find_files(&file, PDF_SUFFIX).unwrap_err();
        assert!(matches!(err, SiftError::NotADirectory { .. }));
    }
}
