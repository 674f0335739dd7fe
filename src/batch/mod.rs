//! Batch processing of a working directory
//!
//! This module contains the run settings, the candidate file listing, the
//! metadata precheck, the per-file pipeline and the sort by pixel size.

pub mod settings;
pub mod file_set;
pub mod precheck;
pub mod results;
pub mod relocate;
pub mod processor;

pub use settings::BatchSettings;
pub use file_set::FileSet;
pub use precheck::has_recognizable_metadata;
pub use results::{BatchReport, BatchResults, ResultRow};
pub use relocate::{relocate_by_scale, RelocationOutcome};
pub use processor::BatchProcessor;
