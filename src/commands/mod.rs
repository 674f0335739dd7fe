//! CLI command implementations
//!
//! This module contains the commands supported by the CLI application,
//! built with the Command pattern.

pub mod command_traits;
pub mod process_command;
pub mod inspect_command;

pub use command_traits::{Command, CommandFactory};
pub use process_command::ProcessCommand;
pub use inspect_command::InspectCommand;

use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use crate::utils::logger::Logger;
use crate::errors::ScaleResult;

/// Factory for creating command instances based on CLI arguments
pub struct SemcropCommandFactory;

impl SemcropCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        SemcropCommandFactory
    }
}

impl Default for SemcropCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for SemcropCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> ScaleResult<Box<dyn Command + 'a>> {
        if args.contains_id("inspect") {
            Ok(Box::new(InspectCommand::new(args, logger)?))
        } else {
            // Default to batch processing
            Ok(Box::new(ProcessCommand::new(args, logger)?))
        }
    }
}

/// Command line interface of the semcrop binary
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("semcrop")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Remove the info bar from SEM images and embed their pixel size")
        .arg(
            Arg::new("directory")
                .help("Directory holding the SEM images")
                .required(false)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output directory name inside the working directory")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .help("Sort outputs into one directory per pixel size")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-sort")
                .long("no-sort")
                .help("Leave all outputs in the output directory")
                .action(ArgAction::SetTrue)
                .conflicts_with("sort"),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Write a result table with pixel size and info bar height")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file with batch settings")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("encoder")
                .long("encoder")
                .help("How output files are written (direct, macro)")
                .value_name("KIND")
                .required(false),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .help("Compression of written files (none, deflate)")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("fallback-height")
                .long("fallback-height")
                .help("Info bar height in pixels when the metadata has none")
                .value_name("PIXELS")
                .required(false),
        )
        .arg(
            Arg::new("inspect")
                .long("inspect")
                .help("Print the calibration of a single image and exit")
                .value_name("FILE")
                .required(false),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchSettings;
    use crate::encoder::EncoderSettings;
    use crate::tiff::OutputCompression;

    fn matches(args: &[&str]) -> ArgMatches {
        build_cli().try_get_matches_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_flags_override_settings() {
        let args = matches(&["semcrop", "images", "--no-sort", "--csv", "-o", "cropped",
                             "--compression", "deflate", "--fallback-height", "70"]);
        let mut settings = BatchSettings::default();
        process_command::apply_overrides(&mut settings, &args).unwrap();

        assert!(!settings.sort_by_pixel_size);
        assert!(settings.create_result_csv);
        assert_eq!(settings.output_directory, "cropped");
        assert_eq!(settings.compression, OutputCompression::Deflate);
        assert_eq!(settings.fallback_info_bar_height, 70);
        assert_eq!(settings.encoder, EncoderSettings::Direct);
    }

    #[test]
    fn test_configured_macro_survives_encoder_flag() {
        let args = matches(&["semcrop", "images", "--encoder", "macro"]);
        let mut settings = BatchSettings::default();
        settings.encoder = EncoderSettings::Macro {
            interpreter: "/opt/fiji/ImageJ".into(),
            script: "custom.ijm".into(),
            args: vec![],
        };
        let configured = settings.encoder.clone();
        process_command::apply_overrides(&mut settings, &args).unwrap();
        assert_eq!(settings.encoder, configured);
    }

    #[test]
    fn test_invalid_flag_values() {
        let mut settings = BatchSettings::default();
        let args = matches(&["semcrop", "images", "--compression", "lzw"]);
        assert!(process_command::apply_overrides(&mut settings, &args).is_err());

        let args = matches(&["semcrop", "images", "--fallback-height", "tall"]);
        assert!(process_command::apply_overrides(&mut settings, &args).is_err());
    }

    #[test]
    fn test_sort_flags_conflict() {
        assert!(build_cli().try_get_matches_from(["semcrop", "-s", "--no-sort"]).is_err());
    }
}
