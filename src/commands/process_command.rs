//! Batch processing command
//!
//! Crops the info bar from every SEM image of a working directory.

use std::path::PathBuf;
use clap::ArgMatches;
use log::{info, warn};

use crate::batch::{BatchProcessor, BatchSettings};
use crate::commands::command_traits::Command;
use crate::encoder::EncoderSettings;
use crate::errors::{ScaleError, ScaleResult};
use crate::tiff::OutputCompression;
use crate::utils::logger::Logger;

/// Command for processing one working directory
pub struct ProcessCommand<'a> {
    /// Directory holding the SEM images
    directory: PathBuf,
    /// Settings after applying config file and flags
    settings: BatchSettings,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> ProcessCommand<'a> {
    /// Create a new process command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new ProcessCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> ScaleResult<Self> {
        let directory = match args.get_one::<String>("directory") {
            Some(dir) => PathBuf::from(dir),
            None => pick_directory()?,
        };

        let mut settings = match args.get_one::<String>("config") {
            Some(path) => {
                info!("Loading settings from {}", path);
                BatchSettings::from_file(PathBuf::from(path).as_path())?
            }
            None => BatchSettings::default(),
        };
        apply_overrides(&mut settings, args)?;
        settings.validate()?;

        Ok(ProcessCommand {
            directory,
            settings,
            logger,
        })
    }
}

impl<'a> Command for ProcessCommand<'a> {
    fn execute(&self) -> ScaleResult<()> {
        info!("Removing info bars from images in {}", self.directory.display());

        let processor = BatchProcessor::new(self.settings.clone(), self.logger)
            .show_progress(true);
        let report = processor.run(&self.directory)?;

        if report.results.is_empty() {
            println!("No images were processed");
        }
        println!("{}", report.summary());
        for (name, reason) in &report.failures {
            println!("  skipped {}: {}", name, reason);
        }
        if let Some(csv) = &report.csv_path {
            println!("Results written to {}", csv.display());
        }

        self.logger.log("Batch processing finished")?;
        Ok(())
    }
}

/// Apply command line flags on top of the loaded settings
pub fn apply_overrides(settings: &mut BatchSettings, args: &ArgMatches) -> ScaleResult<()> {
    if let Some(output) = args.get_one::<String>("output") {
        settings.output_directory = output.clone();
    }
    if args.get_flag("sort") {
        settings.sort_by_pixel_size = true;
    }
    if args.get_flag("no-sort") {
        settings.sort_by_pixel_size = false;
    }
    if args.get_flag("csv") {
        settings.create_result_csv = true;
    }
    if args.get_flag("debug") {
        settings.verbose = true;
    }
    if let Some(name) = args.get_one::<String>("compression") {
        settings.compression = OutputCompression::from_name(name)?;
    }
    if let Some(height) = args.get_one::<String>("fallback-height") {
        settings.fallback_info_bar_height = height.parse::<u32>()
            .map_err(|_| ScaleError::Config(format!("Invalid info bar height: {}", height)))?;
    }
    if let Some(kind) = args.get_one::<String>("encoder") {
        let requested = EncoderSettings::from_kind(kind)?;
        // Keep a configured macro call when the macro encoder is requested again
        let keep_configured = matches!(
            (&requested, &settings.encoder),
            (EncoderSettings::Macro { .. }, EncoderSettings::Macro { .. }));
        if !keep_configured {
            settings.encoder = requested;
        }
    }
    Ok(())
}

#[cfg(feature = "picker")]
fn pick_directory() -> ScaleResult<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select Folder with SEM Images")
        .pick_folder()
        .ok_or_else(|| {
            warn!("No directory selected");
            ScaleError::GenericError("No directory selected".to_string())
        })
}

#[cfg(not(feature = "picker"))]
fn pick_directory() -> ScaleResult<PathBuf> {
    warn!("No directory given and the folder picker is not built in");
    Err(ScaleError::GenericError(
        "Missing working directory, pass it as argument".to_string()))
}
