//! Formatting of scale values
//!
//! Pixel sizes show up in directory names and CSV rows, so they are always
//! printed the same way: shortest round-trip form with at least one decimal
//! (`12345.0`, `1.234`).

/// Suffix of scale bucket directories
pub const BUCKET_SUFFIX: &str = "nm";

/// Format a pixel size for file names and reports
pub fn format_pixel_size(value: f64) -> String {
    format!("{:?}", value)
}

/// Name of the output subdirectory for images with `pixel_size_nm`
pub fn bucket_dir_name(pixel_size_nm: f64) -> String {
    format!("{}{}", format_pixel_size(pixel_size_nm), BUCKET_SUFFIX)
}
