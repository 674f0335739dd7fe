//! Sorting cropped images into one directory per pixel size

use std::path::Path;
use log::{debug, info, warn};

use crate::batch::file_set::FileSet;
use crate::errors::ScaleResult;
use crate::metadata::MetadataScanner;
use crate::utils::format_utils::bucket_dir_name;
use crate::utils::fs_utils;

/// Result of moving the outputs of a run
#[derive(Debug, Default)]
pub struct RelocationOutcome {
    /// Files moved into a scale directory
    pub moved: usize,
    /// Files that stayed in the output root because they have no pixel size
    pub unscaled: Vec<String>,
    /// Files that could not be moved, with the reason
    pub failures: Vec<(String, String)>,
}

/// Move the cropped copy of every file in `sources` into `<output_dir>/<size>nm/`
///
/// The pixel size is read again from the source file, not from the
/// cropped copy. An existing file at the destination is replaced.
pub fn relocate_by_scale(sources: &FileSet, output_dir: &Path) -> RelocationOutcome {
    info!("Moving files to their target directories...");
    let mut outcome = RelocationOutcome::default();

    for source in sources.files() {
        let name = match source.file_name() {
            Some(name) => name,
            None => continue,
        };
        let display_name = name.to_string_lossy().into_owned();

        let cropped = output_dir.join(name);
        if !cropped.is_file() {
            debug!("no output for {}, nothing to move", display_name);
            continue;
        }

        match relocate_file(source, &cropped, output_dir) {
            Ok(true) => outcome.moved += 1,
            Ok(false) => {
                warn!("{} has no pixel size, leaving it in {}", display_name, output_dir.display());
                outcome.unscaled.push(display_name);
            }
            Err(e) => {
                warn!("could not move {}: {}", display_name, e);
                outcome.failures.push((display_name, e.to_string()));
            }
        }
    }

    outcome
}

/// Move one file, returns false if the source has no pixel size
fn relocate_file(source: &Path, cropped: &Path, output_dir: &Path) -> ScaleResult<bool> {
    let pixel_size = match MetadataScanner::pixel_size(source)? {
        Some(size) if size > 0.0 => size,
        _ => return Ok(false),
    };

    let bucket = output_dir.join(bucket_dir_name(pixel_size));
    fs_utils::ensure_dir(&bucket)?;

    let destination = match cropped.file_name() {
        Some(name) => bucket.join(name),
        None => return Ok(false),
    };

    if fs_utils::replace_file(cropped, &destination)? {
        debug!("overwrote {}", destination.display());
    }
    debug!("moved {} to {}", cropped.display(), bucket.display());
    Ok(true)
}
