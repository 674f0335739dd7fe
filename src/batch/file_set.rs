//! Candidate image files of a working directory

use std::fs;
use std::path::{Path, PathBuf};
use log::trace;

use crate::errors::{ScaleError, ScaleResult};

/// Extensions of images that are processed
pub const PROCESS_EXTENSIONS: &[&str] = &["tif", "tiff"];

/// Extensions of images that may prove a directory carries SEM metadata
pub const PRECHECK_EXTENSIONS: &[&str] = &["tif", "tiff", "jpg"];

/// Sorted list of image files directly inside a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<PathBuf>,
}

impl FileSet {
    /// List the files of `directory` whose extension is in `extensions`
    ///
    /// Extensions are compared case-insensitively. Subdirectories are not
    /// entered, so the output directory of an earlier run is never picked up.
    pub fn scan(directory: &Path, extensions: &[&str]) -> ScaleResult<Self> {
        if !directory.is_dir() {
            return Err(ScaleError::NotADirectory(directory.to_path_buf()));
        }

        let entries = fs::read_dir(directory).map_err(|e| ScaleError::filesystem(directory, e))?;
        let mut files = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| ScaleError::filesystem(directory, e))?;
            let path = entry.path();
            if path.is_file() && has_extension(&path, extensions) {
                trace!("Candidate file {}", path.display());
                files.push(path);
            }
        }

        files.sort();
        Ok(FileSet { files })
    }

    /// TIFF files to process
    pub fn tiffs(directory: &Path) -> ScaleResult<Self> {
        Self::scan(directory, PROCESS_EXTENSIONS)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Case-insensitive extension check
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter() {
        assert!(has_extension(Path::new("a.tif"), PROCESS_EXTENSIONS));
        assert!(has_extension(Path::new("a.TIF"), PROCESS_EXTENSIONS));
        assert!(has_extension(Path::new("a.Tiff"), PROCESS_EXTENSIONS));
        assert!(!has_extension(Path::new("a.jpg"), PROCESS_EXTENSIONS));
        assert!(has_extension(Path::new("a.JPG"), PRECHECK_EXTENSIONS));
        assert!(!has_extension(Path::new("tif"), PRECHECK_EXTENSIONS));
    }

    #[test]
    fn test_scan_sorts_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.tif", "a.TIF", "b.jpg", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("cut.tif")).unwrap();

        let tiffs = FileSet::tiffs(dir.path()).unwrap();
        let names: Vec<_> = tiffs.files().iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.TIF", "c.tif"]);

        let all = FileSet::scan(dir.path(), PRECHECK_EXTENSIONS).unwrap();
        assert_eq!(all.len(), 3);
        assert!(!all.is_empty());
    }

    #[test]
    fn test_scan_of_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let tiffs = FileSet::tiffs(dir.path()).unwrap();
        assert!(tiffs.is_empty());
        assert_eq!(tiffs.len(), 0);
    }

    #[test]
    fn test_scan_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.tif");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(FileSet::tiffs(&file), Err(ScaleError::NotADirectory(_))));
    }
}
