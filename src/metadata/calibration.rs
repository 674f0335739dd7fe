//! Calibration values and crop geometry
//!
//! The instrument writes the height of the scanned area (`ResolutionY`) into
//! its metadata, while the stored pixel grid also contains the info bar.
//! The difference of both heights is the strip we have to cut off.

use log::{debug, warn};

use crate::errors::{ScaleError, ScaleResult};
use crate::metadata::scanner::PIXEL_WIDTH_MARKER;

/// Info bar height used when the metadata does not tell us
pub const DEFAULT_INFO_BAR_HEIGHT: u32 = 63;

/// Calibration values read from one file's metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRecord {
    /// Physical size of one pixel in nanometers
    pub pixel_size_nm: Option<f64>,
    /// Height of the image content without the info bar
    pub content_height_px: Option<f64>,
}

impl CalibrationRecord {
    pub fn new(pixel_size_nm: Option<f64>, content_height_px: Option<f64>) -> Self {
        CalibrationRecord { pixel_size_nm, content_height_px }
    }

    /// Pixel size if one was found and it is usable for scaling
    pub fn scale(&self) -> Option<f64> {
        self.pixel_size_nm.filter(|size| *size > 0.0)
    }

    /// Pixel size, or `MetadataNotFound` if there is none to scale with
    pub fn require_scale(&self) -> ScaleResult<f64> {
        self.scale().ok_or(ScaleError::MetadataNotFound(PIXEL_WIDTH_MARKER))
    }

    /// Pixel size with `0` standing in for "not found"
    pub fn pixel_size_or_zero(&self) -> f64 {
        self.pixel_size_nm.unwrap_or(0.0)
    }
}

/// Height of the info bar as derived from the metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoBarHeight {
    /// Height in pixels, negative if the metadata claims more rows than the image has
    pub pixels: i64,
    /// False when the fallback height was used
    pub detected: bool,
}

/// Derive the info bar height from the content height and the decoded image height
///
/// `image_height` has to be the height of the decoded pixel grid. A missing
/// or non-positive content height yields `fallback`.
pub fn compute_info_bar_height(content_height: Option<f64>, image_height: u32, fallback: u32) -> InfoBarHeight {
    match content_height {
        Some(content) if content > 0.0 => {
            let pixels = (image_height as f64 - content).trunc() as i64;
            debug!("detected info bar height: {} px", pixels);
            InfoBarHeight { pixels, detected: true }
        }
        _ => {
            debug!("info bar height not detected, using {} px", fallback);
            InfoBarHeight { pixels: fallback as i64, detected: false }
        }
    }
}

/// Crop rectangle for one image
///
/// The crop always starts at the origin and keeps the full width; only the
/// bottom edge moves up by `info_bar_height_px`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropGeometry {
    pub width: u32,
    pub height: u32,
    pub info_bar_height_px: u32,
    pub detected: bool,
}

impl CropGeometry {
    /// Build the geometry for an image of `width` x `height`
    ///
    /// Negative info bar heights are clamped to zero. An info bar covering
    /// the whole image is an error.
    pub fn from_image_size(width: u32, height: u32, info_bar: InfoBarHeight) -> ScaleResult<Self> {
        let info_bar_height_px = if info_bar.pixels < 0 {
            warn!("Metadata content height exceeds image height {} by {} px, not cropping",
                  height, -info_bar.pixels);
            0
        } else {
            u32::try_from(info_bar.pixels).unwrap_or(u32::MAX)
        };

        if info_bar_height_px >= height {
            return Err(ScaleError::InvalidGeometry(format!(
                "info bar of {} px covers the whole image height of {} px",
                info_bar_height_px, height)));
        }

        Ok(CropGeometry {
            width,
            height,
            info_bar_height_px,
            detected: info_bar.detected,
        })
    }

    /// Height of the image after removing the info bar
    pub fn cropped_height(&self) -> u32 {
        self.height - self.info_bar_height_px
    }
}
