//! Scale encoders
//!
//! A scale encoder turns a decoded SEM image and its crop geometry into the
//! cropped, calibrated output file. The direct encoder does this in-process,
//! the macro encoder hands the file to an external macro interpreter such as
//! Fiji running headless.

mod scale;
mod direct;
mod macro_encoder;
mod factory;

pub use scale::{encode_scale, ScaleMetadata, NANOMETER_UNIT, IMAGEJ_VERSION};
pub use direct::DirectEncoder;
pub use macro_encoder::MacroEncoder;
pub use factory::{EncoderFactory, EncoderSettings};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use image::DynamicImage;

use crate::errors::ScaleResult;
use crate::metadata::CropGeometry;

/// Everything an encoder needs to know about one file
pub struct EncodeJob<'j> {
    /// Original image file
    pub source: &'j Path,
    /// Decoded source image
    pub image: &'j DynamicImage,
    /// Crop rectangle derived from the metadata
    pub geometry: CropGeometry,
    /// Pixel size, `None` writes the image without scale
    pub pixel_size_nm: Option<f64>,
    /// Directory the output file goes to
    pub output_dir: &'j Path,
}

impl<'j> EncodeJob<'j> {
    /// File name shared by the source and the output file
    pub fn file_name(&self) -> &'j OsStr {
        self.source.file_name().unwrap_or_else(|| self.source.as_os_str())
    }

    /// Path of the output file
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.file_name())
    }
}

/// Strategy trait for writing the cropped image with its scale
pub trait ScaleEncoder {
    /// Name for log output
    fn name(&self) -> &'static str;

    /// Write the output file for `job` and return its path
    fn encode(&self, job: &EncodeJob) -> ScaleResult<PathBuf>;
}
