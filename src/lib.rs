pub mod errors;
pub mod metadata;
pub mod tiff;
pub mod encoder;
pub mod transform;
pub mod batch;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::SemCrop;

pub use errors::{ScaleError, ScaleResult};
pub use metadata::{CalibrationRecord, CropGeometry, MetadataScanner};
pub use batch::{BatchProcessor, BatchReport, BatchSettings};
pub use encoder::{ScaleEncoder, EncoderSettings};
