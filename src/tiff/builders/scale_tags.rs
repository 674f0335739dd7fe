//! Scale tag strategies
//!
//! Resolution tags are RATIONAL values and always live outside the IFD, the
//! ImageJ description is plain ASCII.

use std::collections::BTreeMap;
use byteorder::{LittleEndian, WriteBytesExt};
use log::info;

use crate::encoder::ScaleMetadata;
use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::constants::{tags, field_types};
use crate::tiff::ifd::{IFD, IFDEntry};

/// Adds resolution and calibration tags to an IFD
pub struct ScaleTagsBuilder;

impl ScaleTagsBuilder {
    /// Add X/Y resolution, resolution unit and the ImageJ description
    pub fn add_scale_tags(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<u16, Vec<u8>>,
        scale: &ScaleMetadata
    ) {
        info!("Adding scale tags: {} {}/px", scale.units_per_pixel, scale.unit);

        Self::add_rational(ifd, external_data, tags::X_RESOLUTION, scale.x_resolution);
        Self::add_rational(ifd, external_data, tags::Y_RESOLUTION, scale.y_resolution);
        ifd.add_entry(IFDEntry::new(
            tags::RESOLUTION_UNIT,
            field_types::SHORT,
            1,
            scale.resolution_unit as u32)
        );

        BasicTagsBuilder::add_ascii_tag(ifd, external_data, tags::IMAGE_DESCRIPTION, &scale.description);
    }

    fn add_rational(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<u16, Vec<u8>>,
        tag: u16,
        (numerator, denominator): (u32, u32)
    ) {
        let mut bytes = Vec::with_capacity(8);
        // Writing into a Vec can not fail
        let _ = bytes.write_u32::<LittleEndian>(numerator);
        let _ = bytes.write_u32::<LittleEndian>(denominator);

        ifd.add_entry(IFDEntry::new(tag, field_types::RATIONAL, 1, 0));
        external_data.insert(tag, bytes);
    }
}
