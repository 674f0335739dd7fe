//! Custom error types for SEM image processing

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error types raised while scanning, cropping and sorting SEM images
#[derive(Debug)]
pub enum ScaleError {
    /// I/O error
    IoError(io::Error),
    /// Filesystem operation failed on a specific path
    Filesystem {
        path: PathBuf,
        source: io::Error,
    },
    /// Calibration marker is not present in the file
    MetadataNotFound(&'static str),
    /// Calibration marker is present but its value can not be parsed
    MetadataMalformed {
        marker: &'static str,
        value: String,
    },
    /// File matched the extension filter but is not a decodable image
    ImageDecode {
        path: PathBuf,
        message: String,
    },
    /// Precheck found no file with a pixel size in the working directory
    NoMetadataInBatch(PathBuf),
    /// Selected path is not a directory
    NotADirectory(PathBuf),
    /// Crop rectangle would be empty
    InvalidGeometry(String),
    /// The scale encoder could not produce an output file
    EncoderFailed(String),
    /// Invalid configuration value
    Config(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleError::IoError(e) => write!(f, "I/O error: {}", e),
            ScaleError::Filesystem { path, source } =>
                write!(f, "Filesystem error on {}: {}", path.display(), source),
            ScaleError::MetadataNotFound(marker) =>
                write!(f, "Metadata marker '{}' not found", marker),
            ScaleError::MetadataMalformed { marker, value } =>
                write!(f, "Metadata marker '{}' has an unreadable value: '{}'", marker, value),
            ScaleError::ImageDecode { path, message } =>
                write!(f, "Could not decode image {}: {}", path.display(), message),
            ScaleError::NoMetadataInBatch(dir) =>
                write!(f, "No metadata found! None of the images in {} carries a pixel size", dir.display()),
            ScaleError::NotADirectory(path) => write!(f, "{} is no directory", path.display()),
            ScaleError::InvalidGeometry(msg) => write!(f, "Invalid crop geometry: {}", msg),
            ScaleError::EncoderFailed(msg) => write!(f, "Scale encoder failed: {}", msg),
            ScaleError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ScaleError::GenericError(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::IoError(e) => Some(e),
            ScaleError::Filesystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for ScaleError {
    fn from(error: io::Error) -> Self {
        ScaleError::IoError(error)
    }
}

impl From<String> for ScaleError {
    fn from(msg: String) -> Self {
        ScaleError::GenericError(msg)
    }
}

impl ScaleError {
    /// Wrap an I/O error with the path it happened on
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScaleError::Filesystem { path: path.into(), source }
    }

    /// Wrap an image crate error with the path of the file being decoded
    pub fn decode(path: impl Into<PathBuf>, error: image::ImageError) -> Self {
        ScaleError::ImageDecode { path: path.into(), message: error.to_string() }
    }
}

/// Result type for SEM processing operations
pub type ScaleResult<T> = Result<T, ScaleError>;
