//! Factory for creating scale encoders

use std::path::PathBuf;
use log::info;

use crate::encoder::{DirectEncoder, MacroEncoder, ScaleEncoder};
use crate::errors::{ScaleError, ScaleResult};
use crate::tiff::OutputCompression;
use crate::utils::logger::Logger;

/// Default interpreter of the macro encoder
pub const DEFAULT_INTERPRETER: &str = "ImageJ-linux64";

/// Default macro of the macro encoder
pub const DEFAULT_SCRIPT: &str = "remove_scalebar.ijm";

/// Which encoder to use and how to run it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EncoderSettings {
    /// Write the TIFF in-process
    #[default]
    Direct,
    /// Delegate to an external macro interpreter
    Macro {
        interpreter: PathBuf,
        script: PathBuf,
        args: Vec<String>,
    },
}

impl EncoderSettings {
    /// Macro encoder settings with the default headless Fiji call
    pub fn default_macro() -> Self {
        EncoderSettings::Macro {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            script: PathBuf::from(DEFAULT_SCRIPT),
            args: vec!["--headless".to_string(), "-batch".to_string()],
        }
    }

    /// Settings for an encoder kind given by name
    pub fn from_kind(kind: &str) -> ScaleResult<Self> {
        match kind.to_lowercase().as_str() {
            "direct" => Ok(EncoderSettings::Direct),
            "macro" | "imagej" | "fiji" => Ok(Self::default_macro()),
            _ => Err(ScaleError::Config(format!("Unknown encoder: {}", kind))),
        }
    }
}

/// Factory for creating scale encoders
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create the encoder selected by `settings`
    pub fn create<'a>(
        settings: &EncoderSettings,
        compression: OutputCompression,
        logger: &'a Logger
    ) -> Box<dyn ScaleEncoder + 'a> {
        let encoder: Box<dyn ScaleEncoder + 'a> = match settings {
            EncoderSettings::Direct => Box::new(DirectEncoder::new(logger, compression)),
            EncoderSettings::Macro { interpreter, script, args } =>
                Box::new(MacroEncoder::new(interpreter.clone(), script.clone(), args.clone())),
        };
        info!("Using {} scale encoder", encoder.name());
        encoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(EncoderSettings::from_kind("direct").unwrap(), EncoderSettings::Direct);
        assert!(matches!(EncoderSettings::from_kind("Fiji").unwrap(), EncoderSettings::Macro { .. }));
        assert!(EncoderSettings::from_kind("gimp").is_err());
    }

    #[test]
    fn test_factory_selects_encoder() {
        let logger = Logger::disabled();
        let direct = EncoderFactory::create(&EncoderSettings::Direct, OutputCompression::None, &logger);
        assert_eq!(direct.name(), "direct");

        let macro_encoder = EncoderFactory::create(&EncoderSettings::default_macro(), OutputCompression::None, &logger);
        assert_eq!(macro_encoder.name(), "macro");
    }
}
