//! TIFF writing module
//!
//! This module provides the structures needed to write cropped grayscale
//! TIFF files carrying ImageJ-compatible scale metadata.

pub mod ifd;
pub mod builder;
mod builders;
pub mod compression;
pub mod constants;
#[cfg(test)]
mod tests;

pub use ifd::{IFD, IFDEntry};
pub use builder::TiffBuilder;
pub use compression::OutputCompression;
