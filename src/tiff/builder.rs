//! TIFF file construction utilities
//!
//! This module provides functionality for constructing the cropped
//! grayscale TIFF files together with their scale metadata.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::GrayImage;
use log::info;

use crate::encoder::ScaleMetadata;
use crate::errors::{ScaleError, ScaleResult};
use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::scale_tags::ScaleTagsBuilder;
use crate::tiff::builders::writer::WriterBuilder;
use crate::tiff::compression::OutputCompression;
use crate::tiff::constants::tags;
use crate::tiff::ifd::IFD;
use crate::utils::logger::Logger;

/// Value of the Software tag of written files
pub const SOFTWARE_NAME: &str = concat!("semcrop ", env!("CARGO_PKG_VERSION"));

/// Builder for creating single-image TIFF files
pub struct TiffBuilder<'a> {
    logger: &'a Logger,
    pub ifd: IFD,
    strip: Option<Vec<u8>>,
    external_data: BTreeMap<u16, Vec<u8>>,
}

impl<'a> TiffBuilder<'a> {
    /// Create a new TIFF builder
    pub fn new(logger: &'a Logger) -> Self {
        TiffBuilder {
            logger,
            ifd: IFD::new(),
            strip: None,
            external_data: BTreeMap::new(),
        }
    }

    /// Set an 8-bit grayscale image as the pixel data
    pub fn set_gray_image(&mut self, image: &GrayImage, compression: OutputCompression) -> ScaleResult<()> {
        let (width, height) = image.dimensions();
        info!("Setting {}x{} grayscale image ({})", width, height, compression.name());

        BasicTagsBuilder::add_basic_gray_tags(&mut self.ifd, width, height, compression.code());
        let strip_data = compression.compress(image.as_raw())?;
        BasicTagsBuilder::setup_single_strip(&mut self.ifd, &mut self.strip, strip_data);
        Ok(())
    }

    /// Add resolution tags and the ImageJ description
    pub fn add_scale(&mut self, scale: &ScaleMetadata) {
        ScaleTagsBuilder::add_scale_tags(&mut self.ifd, &mut self.external_data, scale);
    }

    /// Add an ASCII tag
    pub fn add_ascii_tag(&mut self, tag: u16, text: &str) {
        BasicTagsBuilder::add_ascii_tag(&mut self.ifd, &mut self.external_data, tag, text);
    }

    /// Add the Software tag naming this tool
    pub fn add_software(&mut self) {
        self.add_ascii_tag(tags::SOFTWARE, SOFTWARE_NAME);
    }

    /// Write the TIFF into any writer
    pub fn write_to(&self, writer: &mut impl std::io::Write) -> ScaleResult<()> {
        let strip = self.strip.as_deref()
            .ok_or_else(|| ScaleError::GenericError("No image data set".to_string()))?;

        WriterBuilder::write(writer, &self.ifd, &self.external_data, strip)
    }

    /// Write the TIFF file to disk
    pub fn write(&self, output_path: &Path) -> ScaleResult<()> {
        info!("Writing TIFF to {}", output_path.display());
        self.logger.log(&format!("Writing TIFF to {}", output_path.display()))?;

        let file = File::create(output_path).map_err(|e| ScaleError::filesystem(output_path, e))?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        self.write_to(&mut writer)
    }
}
