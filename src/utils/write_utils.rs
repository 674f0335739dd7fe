//! TIFF writing utilities
//!
//! Helpers for keeping every block of a written TIFF on a 4-byte boundary.

use std::io::Write;
use crate::errors::ScaleResult;

/// Align an offset to a 4-byte boundary
///
/// Returns the next 4-byte aligned position given a current offset.
pub fn align_to_4_bytes(offset: u64) -> u64 {
    offset + calculate_padding(offset as usize) as u64
}

/// Write padding bytes after a block of `data_len` bytes
///
/// The block has to start on an aligned offset for the result to be aligned.
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> ScaleResult<()> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&vec![0u8; padding])?;
    }
    Ok(())
}

/// Calculate padding required to align to 4-byte boundary
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}
