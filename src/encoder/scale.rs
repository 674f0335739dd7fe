//! Scale metadata block
//!
//! ImageJ (and Fiji) derive the pixel size of a TIFF from its X/Y
//! resolution tags and read the length unit from an `ImageJ=` header in the
//! image description. `encode_scale` produces exactly these values for a
//! given pixel size.

use crate::errors::{ScaleError, ScaleResult};
use crate::tiff::constants::resolution_unit;

/// ImageJ version written into the image description header
pub const IMAGEJ_VERSION: &str = "1.52k";

/// Unit of pixel sizes read from SEM metadata
pub const NANOMETER_UNIT: &str = "nm";

/// Resolution and calibration tags for one image
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleMetadata {
    /// Physical size of one pixel
    pub units_per_pixel: f64,
    /// Length unit of `units_per_pixel`
    pub unit: String,
    /// Pixels per unit as TIFF rational (numerator, denominator)
    pub x_resolution: (u32, u32),
    pub y_resolution: (u32, u32),
    /// TIFF ResolutionUnit value
    pub resolution_unit: u16,
    /// ImageJ image description
    pub description: String,
}

/// Build the scale metadata for square pixels of `units_per_pixel` `unit`
pub fn encode_scale(units_per_pixel: f64, unit: &str) -> ScaleResult<ScaleMetadata> {
    if !units_per_pixel.is_finite() || units_per_pixel <= 0.0 {
        return Err(ScaleError::InvalidGeometry(format!(
            "pixel size must be positive, got {}", units_per_pixel)));
    }

    let resolution = pixels_per_unit_rational(units_per_pixel)?;

    Ok(ScaleMetadata {
        units_per_pixel,
        unit: unit.to_string(),
        x_resolution: resolution,
        y_resolution: resolution,
        resolution_unit: resolution_unit::NONE,
        description: format!("ImageJ={}\nunit={}\n", IMAGEJ_VERSION, unit),
    })
}

/// Express `1 / units_per_pixel` as a TIFF rational
///
/// The pixel size ends up in the denominator, scaled by the largest power of
/// ten that keeps it within a u32, so up to nine decimals stay exact.
fn pixels_per_unit_rational(units_per_pixel: f64) -> ScaleResult<(u32, u32)> {
    let mut factor = 1_000_000_000u32;
    loop {
        let denominator = (units_per_pixel * factor as f64).round();
        if denominator <= u32::MAX as f64 {
            if denominator < 1.0 {
                break;
            }
            let denominator = denominator as u32;
            let divisor = gcd(factor, denominator);
            return Ok((factor / divisor, denominator / divisor));
        }
        if factor == 1 {
            break;
        }
        factor /= 10;
    }

    Err(ScaleError::InvalidGeometry(format!(
        "pixel size {} can not be stored as TIFF resolution", units_per_pixel)))
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl ScaleMetadata {
    /// Pixel size as read back from the X resolution rational
    pub fn resolved_pixel_size(&self) -> f64 {
        let (numerator, denominator) = self.x_resolution;
        denominator as f64 / numerator as f64
    }
}
