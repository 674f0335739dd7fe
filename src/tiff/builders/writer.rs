//! TIFF writing strategies
//!
//! This module handles writing the assembled IFD, its external tag data and
//! the image strip to disk. The file layout is
//! header | IFD | external tag data | image strip, every block starting on a
//! word boundary.

use std::collections::BTreeMap;
use std::io::Write;
use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info};

use crate::errors::{ScaleError, ScaleResult};
use crate::tiff::constants::{header, tags};
use crate::tiff::ifd::IFD;
use crate::utils::write_utils;

/// Handles writing TIFF files
pub struct WriterBuilder;

impl WriterBuilder {
    /// Write a complete single-image TIFF
    pub fn write(
        writer: &mut impl Write,
        ifd: &IFD,
        external_data: &BTreeMap<u16, Vec<u8>>,
        strip: &[u8]
    ) -> ScaleResult<()> {
        if !ifd.has_tag(tags::STRIP_OFFSETS) {
            return Err(ScaleError::GenericError("TIFF has no image strip".to_string()));
        }

        let entries_ifd = IFD { entries: ifd.sorted_entries() };

        // The IFD follows the header directly
        let ifd_offset = header::HEADER_SIZE;
        let tag_data_offsets = Self::calculate_offsets(&entries_ifd, external_data, ifd_offset);

        let strip_offset = tag_data_offsets.get(&tags::STRIP_OFFSETS).copied().unwrap_or(0);
        info!("Writing TIFF: {} entries, strip of {} bytes at offset {}",
              entries_ifd.entries.len(), strip.len(), strip_offset);
        debug!("{}", entries_ifd);

        Self::write_header(writer, ifd_offset as u32)?;
        Self::write_ifd(writer, &entries_ifd, &tag_data_offsets)?;
        write_utils::write_padding(writer, entries_ifd.size_on_disk() as usize)?;
        Self::write_external_data(writer, external_data)?;

        writer.write_all(strip)?;
        write_utils::write_padding(writer, strip.len())?;

        writer.flush()?;
        Ok(())
    }

    /// Calculate the file offset of every external tag value and of the strip
    fn calculate_offsets(
        ifd: &IFD,
        external_data: &BTreeMap<u16, Vec<u8>>,
        ifd_offset: u64
    ) -> BTreeMap<u16, u32> {
        let mut current_offset = write_utils::align_to_4_bytes(ifd_offset + ifd.size_on_disk());
        let mut tag_data_offsets = BTreeMap::new();

        for (tag, data) in external_data {
            tag_data_offsets.insert(*tag, current_offset as u32);
            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        tag_data_offsets.insert(tags::STRIP_OFFSETS, current_offset as u32);
        debug!("Calculated {} tag data offsets", tag_data_offsets.len());

        tag_data_offsets
    }

    /// Write TIFF header
    ///
    /// Byte order marker (always little-endian "II"), version 42 and the
    /// offset of the first IFD.
    fn write_header(writer: &mut impl Write, first_ifd_offset: u32) -> ScaleResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;
        writer.write_u16::<LittleEndian>(header::TIFF_VERSION)?;
        writer.write_u32::<LittleEndian>(first_ifd_offset)?;
        Ok(())
    }

    /// Write an IFD (Image File Directory)
    fn write_ifd(
        writer: &mut impl Write,
        ifd: &IFD,
        tag_offsets: &BTreeMap<u16, u32>
    ) -> ScaleResult<()> {
        writer.write_u16::<LittleEndian>(ifd.entries.len() as u16)?;

        for entry in &ifd.entries {
            // External values and the strip offset are patched in here
            let value_offset = tag_offsets.get(&entry.tag)
                .copied()
                .unwrap_or(entry.value_offset);

            writer.write_u16::<LittleEndian>(entry.tag)?;
            writer.write_u16::<LittleEndian>(entry.field_type)?;
            writer.write_u32::<LittleEndian>(entry.count)?;
            writer.write_u32::<LittleEndian>(value_offset)?;
        }

        // Single image, no next IFD
        writer.write_u32::<LittleEndian>(0)?;
        Ok(())
    }

    /// Write all external tag data in offset order
    fn write_external_data(
        writer: &mut impl Write,
        external_data: &BTreeMap<u16, Vec<u8>>
    ) -> ScaleResult<()> {
        for data in external_data.values() {
            writer.write_all(data)?;
            write_utils::write_padding(writer, data.len())?;
        }
        Ok(())
    }
}
