//! Batch run settings
//!
//! By default outputs are sorted by pixel size and no result table is
//! written. A TOML file can override the defaults, command line flags
//! override both.

use std::fs;
use std::path::{Path, PathBuf};
use log::debug;

use crate::encoder::EncoderSettings;
use crate::errors::{ScaleError, ScaleResult};
use crate::metadata::DEFAULT_INFO_BAR_HEIGHT;
use crate::tiff::OutputCompression;

/// Default name of the output directory inside the working directory
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "cut";

/// Default name of the result table
pub const DEFAULT_CSV_FILE_NAME: &str = "scaling.csv";

/// Settings of one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSettings {
    /// Output directory name, relative to the working directory
    pub output_directory: String,
    /// Move outputs into one subdirectory per pixel size
    pub sort_by_pixel_size: bool,
    /// Write the result table after processing
    pub create_result_csv: bool,
    /// File name of the result table inside the output directory
    pub csv_file_name: String,
    /// Info bar height used when the metadata has no content height
    pub fallback_info_bar_height: u32,
    /// Debug output
    pub verbose: bool,
    /// Strip compression of written files
    pub compression: OutputCompression,
    /// How output files are written
    pub encoder: EncoderSettings,
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings {
            output_directory: DEFAULT_OUTPUT_DIRECTORY.to_string(),
            sort_by_pixel_size: true,
            create_result_csv: false,
            csv_file_name: DEFAULT_CSV_FILE_NAME.to_string(),
            fallback_info_bar_height: DEFAULT_INFO_BAR_HEIGHT,
            verbose: false,
            compression: OutputCompression::None,
            encoder: EncoderSettings::Direct,
        }
    }
}

impl BatchSettings {
    /// Parse settings from a TOML string, missing keys keep their defaults
    pub fn from_str(content: &str) -> ScaleResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| ScaleError::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut settings = BatchSettings::default();

        if let Some(name) = get_str(&toml_value, "output_directory")? {
            settings.output_directory = name.to_string();
        }
        if let Some(sort) = get_bool(&toml_value, "sort_by_pixel_size")? {
            settings.sort_by_pixel_size = sort;
        }
        if let Some(csv) = get_bool(&toml_value, "create_result_csv")? {
            settings.create_result_csv = csv;
        }
        if let Some(name) = get_str(&toml_value, "csv_file_name")? {
            settings.csv_file_name = name.to_string();
        }
        if let Some(verbose) = get_bool(&toml_value, "verbose")? {
            settings.verbose = verbose;
        }
        if let Some(value) = toml_value.get("fallback_info_bar_height") {
            let height = value.as_integer()
                .and_then(|h| u32::try_from(h).ok())
                .ok_or_else(|| ScaleError::Config(
                    "fallback_info_bar_height must be a non-negative integer".to_string()))?;
            settings.fallback_info_bar_height = height;
        }
        if let Some(name) = get_str(&toml_value, "compression")? {
            settings.compression = OutputCompression::from_name(name)?;
        }
        if let Some(table) = toml_value.get("encoder") {
            settings.encoder = Self::parse_encoder(table)?;
        }

        settings.validate()?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> ScaleResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ScaleError::filesystem(path, e))?;
        Self::from_str(&contents)
    }

    /// Parse the `[encoder]` table
    fn parse_encoder(table: &toml::Value) -> ScaleResult<EncoderSettings> {
        let kind = get_str(table, "kind")?.unwrap_or("direct");
        let mut encoder = EncoderSettings::from_kind(kind)?;

        if let EncoderSettings::Macro { interpreter, script, args } = &mut encoder {
            if let Some(value) = get_str(table, "interpreter")? {
                *interpreter = PathBuf::from(value);
            }
            if let Some(value) = get_str(table, "script")? {
                *script = PathBuf::from(value);
            }
            if let Some(value) = table.get("args") {
                let list = value.as_array()
                    .ok_or_else(|| ScaleError::Config("encoder.args must be a list".to_string()))?;
                *args = list.iter()
                    .map(|v| v.as_str().map(str::to_string)
                        .ok_or_else(|| ScaleError::Config("encoder.args must be strings".to_string())))
                    .collect::<ScaleResult<Vec<_>>>()?;
            }
        }

        Ok(encoder)
    }

    /// Reject values that would write outside the working directory
    pub fn validate(&self) -> ScaleResult<()> {
        check_plain_name("output_directory", &self.output_directory)?;
        check_plain_name("csv_file_name", &self.csv_file_name)
    }

    /// Output directory for `working_dir`
    pub fn output_dir(&self, working_dir: &Path) -> PathBuf {
        working_dir.join(&self.output_directory)
    }
}

fn check_plain_name(key: &str, name: &str) -> ScaleResult<()> {
    let path = Path::new(name);
    if name.is_empty() || path.components().count() != 1 || path.is_absolute() || name == ".." || name == "." {
        return Err(ScaleError::Config(format!("{} must be a plain name, got '{}'", key, name)));
    }
    Ok(())
}

fn get_str<'v>(value: &'v toml::Value, key: &str) -> ScaleResult<Option<&'v str>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v.as_str()
            .map(Some)
            .ok_or_else(|| ScaleError::Config(format!("{} must be a string", key))),
    }
}

fn get_bool(value: &toml::Value, key: &str) -> ScaleResult<Option<bool>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v.as_bool()
            .map(Some)
            .ok_or_else(|| ScaleError::Config(format!("{} must be true or false", key))),
    }
}
