use std::path::Path;
use log::info;

use crate::batch::{has_recognizable_metadata, BatchProcessor, BatchReport, BatchSettings};
use crate::errors::{ScaleError, ScaleResult};
use crate::metadata::{compute_info_bar_height, CalibrationRecord, CropGeometry, MetadataScanner, DEFAULT_INFO_BAR_HEIGHT};
use crate::utils::format_utils::bucket_dir_name;
use crate::utils::logger::Logger;

/// Main interface to the semcrop library
pub struct SemCrop {
    logger: Logger,
}

impl SemCrop {
    /// Create a new SemCrop instance
    ///
    /// # Arguments
    /// * `log_file` - Optional path to log file, defaults to "semcrop.log"
    ///
    /// # Returns
    /// A SemCrop instance or an error if the log file cannot be created
    pub fn new(log_file: Option<&str>) -> ScaleResult<Self> {
        let log_path = log_file.unwrap_or("semcrop.log");
        let logger = Logger::new(log_path)?;
        Ok(SemCrop { logger })
    }

    /// Instance that writes no log file
    pub fn without_log() -> Self {
        SemCrop { logger: Logger::disabled() }
    }

    /// Read the calibration embedded in a single image
    pub fn inspect(&self, input_path: &Path) -> ScaleResult<CalibrationRecord> {
        MetadataScanner::scan_file(input_path)
    }

    /// Describe what a batch run would do with a single image
    ///
    /// # Arguments
    /// * `input_path` - Path to the SEM image
    /// * `fallback_info_bar_height` - Info bar height used when none is recorded
    ///
    /// # Returns
    /// A multi-line report or an error if the file cannot be read
    pub fn describe(&self, input_path: &Path, fallback_info_bar_height: Option<u32>) -> ScaleResult<String> {
        let calibration = self.inspect(input_path)?;
        let (width, height) = image::image_dimensions(input_path)
            .map_err(|e| ScaleError::decode(input_path, e))?;

        let mut result = String::from("SEM Image Analysis Results:\n");
        result.push_str(&format!("  File: {}\n", input_path.display()));
        result.push_str(&format!("  Dimensions: {}x{}\n", width, height));

        match calibration.scale() {
            Some(size) => {
                result.push_str(&format!("  Pixel size: {} nm\n", size));
                result.push_str(&format!("  Scale directory: {}\n", bucket_dir_name(size)));
            }
            None => result.push_str("  Pixel size: not found\n"),
        }
        match calibration.content_height_px {
            Some(content) => result.push_str(&format!("  Content height: {} px\n", content)),
            None => result.push_str("  Content height: not found\n"),
        }

        let info_bar = compute_info_bar_height(
            calibration.content_height_px,
            height,
            fallback_info_bar_height.unwrap_or(DEFAULT_INFO_BAR_HEIGHT));
        match CropGeometry::from_image_size(width, height, info_bar) {
            Ok(geometry) => {
                result.push_str(&format!("  Info bar: {} px ({})\n",
                                         geometry.info_bar_height_px,
                                         if geometry.detected { "detected" } else { "fallback" }));
                result.push_str(&format!("  Cropped size: {}x{}\n", geometry.width, geometry.cropped_height()));
            }
            Err(e) => result.push_str(&format!("  Info bar: {}\n", e)),
        }

        Ok(result)
    }

    /// True if at least one image in `directory` carries a pixel size
    pub fn precheck(&self, directory: &Path) -> bool {
        has_recognizable_metadata(directory)
    }

    /// Crop every TIFF in `directory` and write the results below it
    ///
    /// # Arguments
    /// * `directory` - Working directory holding the SEM images
    /// * `settings` - Run settings
    ///
    /// # Returns
    /// The report of the run, or an error if the directory was rejected
    pub fn process_directory(&self, directory: &Path, settings: &BatchSettings) -> ScaleResult<BatchReport> {
        settings.validate()?;
        info!("Processing {}", directory.display());
        let processor = BatchProcessor::new(settings.clone(), &self.logger);
        processor.run(directory)
    }
}
