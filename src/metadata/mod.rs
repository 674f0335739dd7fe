//! SEM calibration metadata
//!
//! Reading the calibration markers out of raw files and turning them into
//! the crop geometry for an image.

pub mod scanner;
pub mod calibration;

pub use scanner::{MetadataScanner, find_pixel_width, find_content_height};
pub use calibration::{CalibrationRecord, CropGeometry, InfoBarHeight, compute_info_bar_height, DEFAULT_INFO_BAR_HEIGHT};
