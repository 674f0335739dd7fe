//! Info bar removal

use std::path::PathBuf;
use image::{DynamicImage, GrayImage};
use log::debug;

use crate::encoder::{EncodeJob, ScaleEncoder};
use crate::errors::ScaleResult;
use crate::metadata::CropGeometry;
use crate::utils::fs_utils;

/// Cut the info bar off the bottom of `image` and convert it to 8-bit grayscale
///
/// The crop rectangle is `(0, 0, width, height - info bar height)`.
pub fn crop_info_bar(image: &DynamicImage, geometry: &CropGeometry) -> GrayImage {
    let cropped = image.crop_imm(0, 0, geometry.width, geometry.cropped_height());
    debug!("Cropped {}x{} to {}x{}",
           geometry.width, geometry.height, cropped.width(), cropped.height());
    cropped.to_luma8()
}

/// Writes cropped images through a scale encoder
pub struct ImageTransformer<'e> {
    encoder: &'e dyn ScaleEncoder,
}

impl<'e> ImageTransformer<'e> {
    pub fn new(encoder: &'e dyn ScaleEncoder) -> Self {
        ImageTransformer { encoder }
    }

    /// Create the output directory if needed and encode one file
    pub fn transform_file(&self, job: &EncodeJob) -> ScaleResult<PathBuf> {
        fs_utils::ensure_dir(job.output_dir)?;
        self.encoder.encode(job)
    }
}
