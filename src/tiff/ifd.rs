//! Image File Directory (IFD) structures
//!
//! An IFD is the list of tag entries describing one image of a TIFF file.
//! We only ever write a single IFD, but keep the entries in the same shape
//! as they end up on disk.

use std::fmt;
use log::{debug, trace};

use crate::tiff::constants::{field_types, tags, tag_name};

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone, Default)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// For values of at most four bytes `value_offset` holds the value itself,
/// otherwise the writer replaces it with the offset of the external data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u32,
    /// Value or offset to values
    pub value_offset: u32,
}

impl IFDEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u32, value_offset: u32) -> Self {
        debug!("Creating new IFD entry: tag={} ({}), type={}, count={}, offset/value={}",
               tag, tag_name(tag), field_type, count, value_offset);

        Self {
            tag,
            field_type,
            count,
            value_offset,
        }
    }

    /// Size in bytes of a single value of this entry's field type
    pub fn field_type_size(&self) -> usize {
        match self.field_type {
            field_types::BYTE | field_types::ASCII | field_types::UNDEFINED => 1,
            field_types::SHORT => 2,
            field_types::LONG => 4,
            field_types::RATIONAL => 8,
            _ => 1,
        }
    }

    /// Whether the value fits into the four bytes of the entry itself
    pub fn is_value_inline(&self) -> bool {
        self.field_type_size() * self.count as usize <= 4
    }
}

impl IFD {
    /// Creates an empty IFD
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, replacing any existing entry with the same tag
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry {} ({})", entry.tag, tag_name(entry.tag));
        self.entries.retain(|e| e.tag != entry.tag);
        self.entries.push(entry);
    }

    /// Gets a tag value (value_offset) directly
    pub fn get_tag_value(&self, tag: u16) -> Option<u32> {
        self.get_entry(tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.get_entry(tag).is_some()
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Gets the dimensions of the image described by this IFD
    pub fn get_dimensions(&self) -> Option<(u32, u32)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Entries sorted by tag number, as TIFF 6.0 requires
    pub fn sorted_entries(&self) -> Vec<IFDEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|entry| entry.tag);
        sorted
    }

    /// Size of this IFD on disk: count, 12 bytes per entry, next offset
    pub fn size_on_disk(&self) -> u64 {
        2 + 12 * self.entries.len() as u64 + 4
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD ({} entries)", self.entries.len())?;
        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }
        for entry in self.sorted_entries() {
            writeln!(f, "    {} ({}): {} x{} [type {}]",
                     entry.tag, tag_name(entry.tag), entry.value_offset, entry.count, entry.field_type)?;
        }
        Ok(())
    }
}
