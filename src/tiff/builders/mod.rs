//! TIFF builder strategy modules
//!
//! This module contains strategy implementations for the TiffBuilder,
//! organized by functionality category.

pub mod basic_tags;
pub mod scale_tags;
pub mod writer;
