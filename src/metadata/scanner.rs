//! Calibration marker search in raw SEM TIFF bytes
//!
//! FEI / Thermo Fisher instruments store their acquisition settings as
//! `key=value` text lines inside a private TIFF tag. Instead of walking the
//! IFDs we search the whole file for the two markers we need, which also
//! works for files where the text block moved or the IFD is unusual.

use std::fs::File;
use std::path::Path;

use lazy_static::lazy_static;
use log::{debug, trace};
use memmap2::Mmap;
use regex::bytes::Regex;

use crate::errors::{ScaleError, ScaleResult};
use crate::metadata::calibration::CalibrationRecord;

/// Marker of the physical pixel width (meters)
pub const PIXEL_WIDTH_MARKER: &str = "PixelWidth";

/// Marker of the height of the image content without the info bar (pixels)
pub const CONTENT_HEIGHT_MARKER: &str = "ResolutionY";

/// Meters to nanometers
const NANOMETERS_PER_METER: f64 = 1e9;

/// Significant digits kept after the unit conversion
///
/// Instruments write at most six, the rest is float noise from the multiplication.
const PIXEL_SIZE_SIGNIFICANT_DIGITS: i32 = 12;

lazy_static! {
    // The rest of the marker line, up to the line break
    static ref PIXEL_WIDTH_LINE: Regex = Regex::new(r"(?-u)PixelWidth([^\r\n]*)")
        .expect("valid PixelWidth pattern");
    static ref CONTENT_HEIGHT_LINE: Regex = Regex::new(r"(?-u)ResolutionY([^\r\n]*)")
        .expect("valid ResolutionY pattern");
}

/// Find the pixel size in nanometers
///
/// Returns `Ok(None)` if the file has no `PixelWidth` marker. Only the first
/// occurrence is used.
pub fn find_pixel_width(bytes: &[u8]) -> ScaleResult<Option<f64>> {
    let meters = match find_marker_value(bytes, &PIXEL_WIDTH_LINE, PIXEL_WIDTH_MARKER)? {
        Some(value) => value,
        None => return Ok(None),
    };

    let nanometers = round_significant(meters * NANOMETERS_PER_METER, PIXEL_SIZE_SIGNIFICANT_DIGITS);
    trace!("PixelWidth {} m -> {} nm", meters, nanometers);
    Ok(Some(nanometers))
}

/// Round `value` to `digits` significant digits
fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let exponent = digits - 1 - value.abs().log10().floor() as i32;
    if exponent >= 0 {
        let scale = 10f64.powi(exponent);
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-exponent);
        (value / scale).round() * scale
    }
}

/// Find the content height (image height without the info bar) in pixels
pub fn find_content_height(bytes: &[u8]) -> ScaleResult<Option<f64>> {
    find_marker_value(bytes, &CONTENT_HEIGHT_LINE, CONTENT_HEIGHT_MARKER)
}

/// Locate `marker` and parse the number following the `=` on its line
fn find_marker_value(bytes: &[u8], pattern: &Regex, marker: &'static str) -> ScaleResult<Option<f64>> {
    let captures = match pattern.captures(bytes) {
        Some(c) => c,
        None => {
            trace!("Marker {} not present", marker);
            return Ok(None);
        }
    };

    let rest = captures.get(1).map(|m| m.as_bytes()).unwrap_or_default();
    let value_bytes = match rest.iter().position(|&b| b == b'=') {
        Some(pos) => value_token(&rest[pos + 1..]),
        None => return Err(malformed(marker, rest)),
    };

    let text = std::str::from_utf8(value_bytes)
        .map_err(|_| malformed(marker, value_bytes))?
        .trim();

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(malformed(marker, value_bytes)),
    }
}

/// Cut the value at the first backslash or non-printable byte
///
/// The instrument text block ends its lines with `\r\n` and pads with NUL
/// bytes, so anything outside printable ASCII terminates the value.
fn value_token(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter()
        .position(|&b| b == b'\\' || !(0x20..0x7f).contains(&b))
        .unwrap_or(bytes.len());
    &bytes[..end]
}

fn malformed(marker: &'static str, value: &[u8]) -> ScaleError {
    ScaleError::MetadataMalformed {
        marker,
        value: String::from_utf8_lossy(value).trim().to_string(),
    }
}

/// Reads calibration values from files on disk
///
/// Each call maps the file, searches it and unmaps it again before
/// returning, so the same file can be opened by the image decoder right
/// afterwards.
pub struct MetadataScanner;

impl MetadataScanner {
    /// Extract pixel size and content height from a file
    pub fn scan_file(path: &Path) -> ScaleResult<CalibrationRecord> {
        Self::with_file_bytes(path, |bytes| {
            let pixel_size_nm = find_pixel_width(bytes)?;
            let content_height_px = find_content_height(bytes)?;
            Ok(CalibrationRecord::new(pixel_size_nm, content_height_px))
        })
    }

    /// Extract only the pixel size from a file
    pub fn pixel_size(path: &Path) -> ScaleResult<Option<f64>> {
        Self::with_file_bytes(path, find_pixel_width)
    }

    /// Run `scan` over the memory-mapped content of `path`
    fn with_file_bytes<T>(path: &Path, scan: impl FnOnce(&[u8]) -> ScaleResult<T>) -> ScaleResult<T> {
        let file = File::open(path).map_err(|e| ScaleError::filesystem(path, e))?;
        let len = file.metadata().map_err(|e| ScaleError::filesystem(path, e))?.len();

        if len == 0 {
            debug!("{} is empty", path.display());
            return scan(&[]);
        }

        // Safety: the map is read-only and dropped before this function returns.
        // Files are not expected to be modified while the batch runs.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| ScaleError::filesystem(path, e))?;
        trace!("Mapped {} bytes of {}", map.len(), path.display());

        let result = scan(&map);
        drop(map);
        drop(file);
        result
    }
}
