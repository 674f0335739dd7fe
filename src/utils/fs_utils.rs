//! Filesystem helpers for the output tree

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use log::debug;

use crate::errors::{ScaleError, ScaleResult};

/// Create a directory and its parents, an existing directory is fine
pub fn ensure_dir(path: &Path) -> ScaleResult<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(ScaleError::filesystem(path, e)),
    }
}

/// Move `source` to `destination`, deleting a file already at the destination
///
/// Returns true if an existing file was replaced.
pub fn replace_file(source: &Path, destination: &Path) -> ScaleResult<bool> {
    let replaced = destination.is_file();
    if replaced {
        debug!("overwriting {}", destination.display());
        fs::remove_file(destination).map_err(|e| ScaleError::filesystem(destination, e))?;
    }

    fs::rename(source, destination).map_err(|e| ScaleError::filesystem(source, e))?;
    Ok(replaced)
}

/// Hidden sibling path used while a file is being written
pub fn partial_path(destination: &Path) -> PathBuf {
    let name = destination.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{}.partial", name))
}
