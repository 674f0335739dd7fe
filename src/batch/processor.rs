//! Batch orchestration
//!
//! A run goes through precheck, processing of every TIFF, the optional
//! result table and the optional sort by pixel size. Only a failed precheck
//! stops a run; problems with single files are logged and the file skipped.

use std::path::{Path, PathBuf};
use image::ImageReader;
use log::{debug, error, info, warn};

use crate::batch::file_set::FileSet;
use crate::batch::precheck::has_recognizable_metadata;
use crate::batch::relocate::relocate_by_scale;
use crate::batch::results::{BatchReport, ResultRow};
use crate::batch::settings::BatchSettings;
use crate::encoder::{EncodeJob, EncoderFactory, ScaleEncoder};
use crate::errors::{ScaleError, ScaleResult};
use crate::metadata::{compute_info_bar_height, CropGeometry, MetadataScanner};
use crate::transform::ImageTransformer;
use crate::utils::fs_utils;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Drives the processing of one working directory
pub struct BatchProcessor<'a> {
    settings: BatchSettings,
    logger: &'a Logger,
    encoder: Box<dyn ScaleEncoder + 'a>,
    show_progress: bool,
}

impl<'a> BatchProcessor<'a> {
    /// Create a processor using the encoder selected in `settings`
    pub fn new(settings: BatchSettings, logger: &'a Logger) -> Self {
        let encoder = EncoderFactory::create(&settings.encoder, settings.compression, logger);
        Self::with_encoder(settings, logger, encoder)
    }

    /// Create a processor with an explicit encoder
    pub fn with_encoder(settings: BatchSettings, logger: &'a Logger, encoder: Box<dyn ScaleEncoder + 'a>) -> Self {
        BatchProcessor {
            settings,
            logger,
            encoder,
            show_progress: false,
        }
    }

    /// Draw a progress bar while processing
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Process every TIFF in `working_dir`
    ///
    /// Fails with `NoMetadataInBatch` before writing anything if no image in
    /// the directory carries a pixel size.
    pub fn run(&self, working_dir: &Path) -> ScaleResult<BatchReport> {
        if !working_dir.is_dir() {
            return Err(ScaleError::NotADirectory(working_dir.to_path_buf()));
        }
        debug!("Selected working directory: {}", working_dir.display());

        if !has_recognizable_metadata(working_dir) {
            return Err(ScaleError::NoMetadataInBatch(working_dir.to_path_buf()));
        }

        let files = FileSet::tiffs(working_dir)?;
        if files.is_empty() {
            warn!("No TIFF files in {}", working_dir.display());
        } else {
            info!("{} Tiffs found!", files.len());
        }

        let output_dir = self.settings.output_dir(working_dir);
        let mut report = self.process_all(&files, &output_dir);

        if self.settings.create_result_csv {
            match self.write_result_csv(&report, &output_dir) {
                Ok(path) => report.csv_path = Some(path),
                Err(e) => {
                    error!("Could not write result CSV: {}", e);
                    report.failures.push((self.settings.csv_file_name.clone(), e.to_string()));
                }
            }
        }

        if self.settings.sort_by_pixel_size {
            let outcome = relocate_by_scale(&files, &output_dir);
            report.relocated = outcome.moved;
            report.failures.extend(outcome.failures);
        }

        info!("{}", report.summary());
        self.logger.log(&format!("{}: {}", working_dir.display(), report.summary()))?;
        Ok(report)
    }

    /// Run the per-file pipeline over all files
    fn process_all(&self, files: &FileSet, output_dir: &Path) -> BatchReport {
        let mut report = BatchReport::default();
        let transformer = ImageTransformer::new(self.encoder.as_ref());
        let progress = if self.show_progress {
            ProgressTracker::new(files.len() as u64, "Removing info bars")
        } else {
            ProgressTracker::hidden(files.len() as u64)
        };

        for (position, path) in files.files().iter().enumerate() {
            let name = file_name(path);
            info!("Analysing {} ({}/{})", name, position + 1, files.len());
            progress.set_message(&name);

            match self.process_file(&transformer, path, output_dir) {
                Ok(row) => report.results.push(row),
                Err(e) => {
                    error!("{}: {}, skipping file", name, e);
                    let _ = self.logger.log(&format!("skipped {}: {}", name, e));
                    report.failures.push((name, e.to_string()));
                }
            }
            progress.increment(1);
        }

        progress.finish();
        report
    }

    /// Scan, crop and write a single file
    pub fn process_file(&self, transformer: &ImageTransformer, path: &Path, output_dir: &Path) -> ScaleResult<ResultRow> {
        // The scan releases its file mapping before the decoder opens the file
        let calibration = MetadataScanner::scan_file(path)?;

        let image = ImageReader::open(path)
            .map_err(|e| ScaleError::filesystem(path, e))?
            .with_guessed_format()
            .map_err(|e| ScaleError::filesystem(path, e))?
            .decode()
            .map_err(|e| ScaleError::decode(path, e))?;

        let info_bar = compute_info_bar_height(
            calibration.content_height_px,
            image.height(),
            self.settings.fallback_info_bar_height);
        let geometry = CropGeometry::from_image_size(image.width(), image.height(), info_bar)?;

        let pixel_size_nm = match calibration.require_scale() {
            Ok(size) => {
                debug!("detected image scale: {} nm / px", size);
                Some(size)
            }
            Err(e) => {
                warn!("{}: {}, writing without scale", file_name(path), e);
                None
            }
        };

        let job = EncodeJob {
            source: path,
            image: &image,
            geometry,
            pixel_size_nm,
            output_dir,
        };
        transformer.transform_file(&job)?;

        Ok(ResultRow {
            filename: file_name(path),
            pixel_size_nm: calibration.pixel_size_or_zero(),
            info_bar_height_px: geometry.info_bar_height_px,
        })
    }

    fn write_result_csv(&self, report: &BatchReport, output_dir: &Path) -> ScaleResult<PathBuf> {
        fs_utils::ensure_dir(output_dir)?;
        let path = output_dir.join(&self.settings.csv_file_name);
        report.results.write_csv(&path)?;
        Ok(path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
