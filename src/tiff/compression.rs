//! Strip compression for written images

use std::io::Write;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;

use crate::errors::{ScaleError, ScaleResult};
use crate::tiff::constants::compression;

/// Compression applied to the image strip of written files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputCompression {
    #[default]
    None,
    /// Adobe Deflate (zlib), compression code 8
    Deflate,
}

impl OutputCompression {
    /// Parse a compression name as used in config files and on the command line
    pub fn from_name(name: &str) -> ScaleResult<Self> {
        match name.to_lowercase().as_str() {
            "none" | "uncompressed" => Ok(OutputCompression::None),
            "deflate" | "zip" | "adobe deflate" => Ok(OutputCompression::Deflate),
            _ => Err(ScaleError::Config(format!("Unknown compression type: {}", name))),
        }
    }

    /// TIFF compression code
    pub fn code(&self) -> u16 {
        match self {
            OutputCompression::None => compression::NONE,
            OutputCompression::Deflate => compression::DEFLATE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputCompression::None => "Uncompressed",
            OutputCompression::Deflate => "Adobe Deflate",
        }
    }

    /// Compress one strip of pixel data
    pub fn compress(&self, data: &[u8]) -> ScaleResult<Vec<u8>> {
        match self {
            OutputCompression::None => Ok(data.to_vec()),
            OutputCompression::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                let compressed = encoder.finish()?;
                debug!("Deflate compressed {} bytes to {}", data.len(), compressed.len());
                Ok(compressed)
            }
        }
    }
}
