//! Directory precheck
//!
//! Before any file is written we make sure the directory holds images from
//! a supported instrument. Sampling stops at the first file with a pixel
//! size, so large directories are not scanned twice.

use std::path::Path;
use log::{info, warn};

use crate::batch::file_set::{FileSet, PRECHECK_EXTENSIONS};
use crate::metadata::MetadataScanner;

/// True if at least one image in `directory` has a pixel size greater than zero
pub fn has_recognizable_metadata(directory: &Path) -> bool {
    let candidates = match FileSet::scan(directory, PRECHECK_EXTENSIONS) {
        Ok(set) => set,
        Err(e) => {
            warn!("{}", e);
            return false;
        }
    };

    for path in candidates.files() {
        info!("checking if file \"{}\" has expected metadata", display_name(path));
        match MetadataScanner::pixel_size(path) {
            Ok(Some(size)) if size > 0.0 => {
                info!("detected image scale: {} nm / px [successful]", size);
                return true;
            }
            Ok(_) => {}
            Err(e) => warn!("{}: {}", display_name(path), e),
        }
    }

    false
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_first_file_with_scale_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.tif"), b"no metadata").unwrap();
        fs::write(dir.path().join("b.jpg"), b"PixelWidth=abc\r\n").unwrap();
        fs::write(dir.path().join("c.TIF"), b"PixelWidth=1e-09\r\n").unwrap();

        assert!(has_recognizable_metadata(dir.path()));
    }

    #[test]
    fn test_zero_pixel_size_does_not_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.tif"), b"PixelWidth=0\r\n").unwrap();
        fs::write(dir.path().join("b.png"), b"PixelWidth=1e-09\r\n").unwrap();

        assert!(!has_recognizable_metadata(dir.path()));
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_recognizable_metadata(&dir.path().join("missing")));
    }
}
