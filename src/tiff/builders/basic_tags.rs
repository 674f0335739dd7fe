//! Basic TIFF tag strategies
//!
//! This module provides functionality for adding the tags every baseline
//! grayscale TIFF needs: dimensions, sample layout and the image strip.

use std::collections::BTreeMap;
use log::{debug, info};

use crate::tiff::constants::{tags, field_types, photometric, planar_config};
use crate::tiff::ifd::{IFD, IFDEntry};

/// Adds basic TIFF tags to an IFD
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Add common tags for an 8-bit grayscale image
    ///
    /// Grayscale images use a single sample per pixel, so every value fits
    /// inline and no external data is needed.
    pub fn add_basic_gray_tags(ifd: &mut IFD, width: u32, height: u32, compression: u16) {
        info!("Adding basic grayscale tags for {}x{} image", width, height);

        ifd.add_entry(IFDEntry::new(tags::NEW_SUBFILE_TYPE, field_types::LONG, 1, 0));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, width));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, field_types::LONG, 1, height));
        ifd.add_entry(IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 1, 8));
        ifd.add_entry(IFDEntry::new(tags::COMPRESSION, field_types::SHORT, 1, compression as u32));
        ifd.add_entry(IFDEntry::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            field_types::SHORT,
            1,
            photometric::BLACK_IS_ZERO as u32)
        );
        ifd.add_entry(IFDEntry::new(tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, 1));
        ifd.add_entry(IFDEntry::new(
            tags::PLANAR_CONFIGURATION,
            field_types::SHORT,
            1,
            planar_config::CHUNKY as u32)
        );
    }

    /// Setup single strip for an IFD
    ///
    /// The whole image goes into one strip. StripOffsets is a placeholder
    /// until the writer knows where the strip lands in the file.
    pub fn setup_single_strip(ifd: &mut IFD, strip: &mut Option<Vec<u8>>, strip_data: Vec<u8>) {
        debug!("Setting up single strip: {} bytes", strip_data.len());

        ifd.add_entry(IFDEntry::new(tags::STRIP_OFFSETS, field_types::LONG, 1, 0));
        ifd.add_entry(IFDEntry::new(
            tags::STRIP_BYTE_COUNTS,
            field_types::LONG,
            1,
            strip_data.len() as u32)
        );

        if let Some((_, height)) = ifd.get_dimensions() {
            ifd.add_entry(IFDEntry::new(tags::ROWS_PER_STRIP, field_types::LONG, 1, height));
        }

        *strip = Some(strip_data);
    }

    /// Add an ASCII tag, inline when it fits into four bytes
    pub fn add_ascii_tag(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<u16, Vec<u8>>,
        tag: u16,
        text: &str
    ) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0); // ASCII values are NUL terminated

        Self::add_bytes_tag(ifd, external_data, tag, field_types::ASCII, bytes);
    }

    /// Add a tag whose value is given as raw bytes
    pub fn add_bytes_tag(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<u16, Vec<u8>>,
        tag: u16,
        field_type: u16,
        bytes: Vec<u8>
    ) {
        let entry = IFDEntry::new(tag, field_type, bytes.len() as u32, 0);

        if entry.is_value_inline() {
            let mut inline = [0u8; 4];
            inline[..bytes.len()].copy_from_slice(&bytes);
            external_data.remove(&tag);
            ifd.add_entry(IFDEntry { value_offset: u32::from_le_bytes(inline), ..entry });
        } else {
            ifd.add_entry(entry);
            external_data.insert(tag, bytes);
        }
    }
}
