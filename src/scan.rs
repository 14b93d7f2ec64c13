//! Input discovery for directory mode.
//!
//! Walks a directory and returns the files that look like decodable images,
//! judged by extension only (case-insensitive). Content is not sniffed here:
//! a corrupt `.jpg` is still returned and fails later, in its own pipeline.
//!
//! ```text
//! photos/
//! ├── a.JPG            ✓
//! ├── b.png            ✓
//! ├── notes.txt        ✗ unsupported extension
//! ├── .c.png.1-0.partial ✗ hidden (includes in-flight outputs)
//! └── trips/
//!     └── d.webp       ✓ only with `recursive`
//! ```
//!
//! Results are sorted by path so runs are reproducible.

use crate::imaging::supported_input_extensions;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Find image files under `root`. Only the top level unless `recursive`.
pub fn find_image_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut walker = WalkDir::new(root).follow_links(true);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
    {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Whether `path` has one of the supported input extensions.
pub fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().contains(&ext.as_str())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn layout() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("b.png"));
        touch(&root.join("a.JPG"));
        touch(&root.join("c.jpeg"));
        touch(&root.join("d.gif"));
        touch(&root.join("e.WebP"));
        touch(&root.join("notes.txt"));
        touch(&root.join("raw.tiff"));
        touch(&root.join(".hidden.png"));
        touch(&root.join("trips/f.webp"));
        touch(&root.join("trips/deeper/g.png"));
        touch(&root.join(".cache/h.png"));
        tmp
    }

    #[test]
    fn top_level_only_by_default() {
        let tmp = layout();
        let files = find_image_files(tmp.path(), false).unwrap();
        assert_eq!(
            names(tmp.path(), &files),
            vec!["a.JPG", "b.png", "c.jpeg", "d.gif", "e.WebP"]
        );
    }

    #[test]
    fn recursive_descends_and_skips_hidden_dirs() {
        let tmp = layout();
        let files = find_image_files(tmp.path(), true).unwrap();
        assert_eq!(
            names(tmp.path(), &files),
            vec![
                "a.JPG",
                "b.png",
                "c.jpeg",
                "d.gif",
                "e.WebP",
                "trips/deeper/g.png",
                "trips/f.webp",
            ]
        );
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(find_image_files(tmp.path(), true).unwrap().is_empty());
    }

    #[test]
    fn file_root_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.png");
        touch(&file);
        assert!(matches!(
            find_image_files(&file, false),
            Err(ScanError::NotADirectory(_))
        ));
    }

    #[test]
    fn missing_root_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let result = find_image_files(&tmp.path().join("nope"), true);
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn is_image_checks_extension_case_insensitively() {
        assert!(is_image(Path::new("x/Photo.JPEG")));
        assert!(is_image(Path::new("x/anim.gif")));
        assert!(!is_image(Path::new("x/raw.cr2")));
        assert!(!is_image(Path::new("x/noext")));
    }
}
