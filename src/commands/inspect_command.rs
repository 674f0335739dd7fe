//! Single image inspection command

use std::path::PathBuf;
use clap::ArgMatches;
use log::info;

use crate::api::SemCrop;
use crate::commands::command_traits::Command;
use crate::errors::{ScaleError, ScaleResult};
use crate::utils::logger::Logger;

/// Command printing the calibration and crop of one image
pub struct InspectCommand<'a> {
    input_file: PathBuf,
    fallback_height: Option<u32>,
    logger: &'a Logger,
}

impl<'a> InspectCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> ScaleResult<Self> {
        let input_file = args.get_one::<String>("inspect")
            .map(PathBuf::from)
            .ok_or_else(|| ScaleError::GenericError("Missing file to inspect".to_string()))?;

        let fallback_height = match args.get_one::<String>("fallback-height") {
            Some(value) => Some(value.parse::<u32>()
                .map_err(|_| ScaleError::Config(format!("Invalid info bar height: {}", value)))?),
            None => None,
        };

        Ok(InspectCommand {
            input_file,
            fallback_height,
            logger,
        })
    }
}

impl<'a> Command for InspectCommand<'a> {
    fn execute(&self) -> ScaleResult<()> {
        info!("Inspecting {}", self.input_file.display());

        let report = SemCrop::without_log().describe(&self.input_file, self.fallback_height)?;
        println!("{}", report);

        self.logger.log(&report)?;
        Ok(())
    }
}
