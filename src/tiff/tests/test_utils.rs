use std::io::Cursor;
use byteorder::{LittleEndian, ReadBytesExt};
use image::GrayImage;

/// Metadata block as found in FEI/Thermo Fisher SEM images
pub const FEI_METADATA: &str = "[Scan]\r\nPixelWidth=1.2345e-05\r\nPixelHeight=1.2345e-05\r\n[Image]\r\nResolutionX=16\r\nResolutionY=9\r\n";

/// One directory entry as read back from a written file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    pub value_offset: u32,
}

/// Creates a grayscale test image with a horizontal gradient
pub fn create_gradient_image(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| image::Luma([((x * 7 + y * 3) % 256) as u8]))
}

/// Read the header and first IFD of a little-endian TIFF
pub fn read_entries(bytes: &[u8]) -> Vec<RawEntry> {
    let mut cursor = Cursor::new(bytes);
    assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 0x4949);
    assert_eq!(cursor.read_u16::<LittleEndian>().unwrap(), 42);
    let ifd_offset = cursor.read_u32::<LittleEndian>().unwrap();
    cursor.set_position(ifd_offset as u64);

    let count = cursor.read_u16::<LittleEndian>().unwrap();
    let entries = (0..count)
        .map(|_| RawEntry {
            tag: cursor.read_u16::<LittleEndian>().unwrap(),
            field_type: cursor.read_u16::<LittleEndian>().unwrap(),
            count: cursor.read_u32::<LittleEndian>().unwrap(),
            value_offset: cursor.read_u32::<LittleEndian>().unwrap(),
        })
        .collect();

    assert_eq!(cursor.read_u32::<LittleEndian>().unwrap(), 0, "expected a single IFD");
    entries
}

pub fn find_entry(entries: &[RawEntry], tag: u16) -> RawEntry {
    *entries.iter()
        .find(|e| e.tag == tag)
        .unwrap_or_else(|| panic!("tag {} missing", tag))
}

/// Read a RATIONAL value stored at `offset`
pub fn read_rational(bytes: &[u8], offset: u32) -> (u32, u32) {
    let mut cursor = Cursor::new(&bytes[offset as usize..]);
    let numerator = cursor.read_u32::<LittleEndian>().unwrap();
    let denominator = cursor.read_u32::<LittleEndian>().unwrap();
    (numerator, denominator)
}
