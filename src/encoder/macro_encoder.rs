//! Scale encoder delegating to an external macro interpreter
//!
//! The interpreter is started as
//! `<interpreter> <args...> <script> <source> "<outputDir>|<infoBarHeight>|<scale>|<scaleFlag>"`
//! and is expected to write `<outputDir>/<file name>` before it exits.

use std::fs;
use std::path::{PathBuf, MAIN_SEPARATOR};
use std::process::Command;
use log::{debug, info};

use crate::encoder::{EncodeJob, ScaleEncoder};
use crate::errors::{ScaleError, ScaleResult};
use crate::utils::format_utils::format_pixel_size;

/// Runs a macro (e.g. an ImageJ macro in headless Fiji) per image
pub struct MacroEncoder {
    interpreter: PathBuf,
    script: PathBuf,
    args: Vec<String>,
}

impl MacroEncoder {
    pub fn new(interpreter: PathBuf, script: PathBuf, args: Vec<String>) -> Self {
        MacroEncoder { interpreter, script, args }
    }

    /// Parameter string handed to the macro
    pub fn parameter_string(job: &EncodeJob) -> String {
        let scale = job.pixel_size_nm.unwrap_or(0.0);
        let scale_flag = if job.pixel_size_nm.is_some() { 1 } else { 0 };

        format!("{}{}|{}|{}|{}",
                job.output_dir.display(),
                MAIN_SEPARATOR,
                job.geometry.info_bar_height_px,
                format_pixel_size(scale),
                scale_flag)
    }
}

impl ScaleEncoder for MacroEncoder {
    fn name(&self) -> &'static str {
        "macro"
    }

    fn encode(&self, job: &EncodeJob) -> ScaleResult<PathBuf> {
        let parameters = Self::parameter_string(job);
        info!("Running {} {} for {}", self.interpreter.display(), self.script.display(), job.source.display());
        debug!("Macro parameters: {}", parameters);

        // Only a file written by this run counts as output
        let output_path = job.output_path();
        if output_path.is_file() {
            debug!("removing stale {}", output_path.display());
            fs::remove_file(&output_path).map_err(|e| ScaleError::filesystem(&output_path, e))?;
        }

        let output = Command::new(&self.interpreter)
            .args(&self.args)
            .arg(&self.script)
            .arg(job.source)
            .arg(&parameters)
            .output()
            .map_err(|e| ScaleError::EncoderFailed(format!(
                "could not start {}: {}", self.interpreter.display(), e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("Macro output: {}", stdout.trim());
        }

        if !output.status.success() {
            return Err(ScaleError::EncoderFailed(format!(
                "{} exited with {}: {}",
                self.interpreter.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim())));
        }

        if !output_path.is_file() {
            return Err(ScaleError::EncoderFailed(format!(
                "macro did not write {}", output_path.display())));
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage};
    use std::path::Path;
    use crate::metadata::{compute_info_bar_height, CropGeometry};

    fn job<'j>(source: &'j Path, image: &'j DynamicImage, output_dir: &'j Path, pixel_size_nm: Option<f64>) -> EncodeJob<'j> {
        let bar = compute_info_bar_height(Some(8.0), 10, 63);
        EncodeJob {
            source,
            image,
            geometry: CropGeometry::from_image_size(4, 10, bar).unwrap(),
            pixel_size_nm,
            output_dir,
        }
    }

    #[test]
    fn test_parameter_string() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(4, 10));
        let source = Path::new("in").join("a.tif");
        let out = Path::new("in").join("cut");

        let with_scale = job(&source, &image, &out, Some(12345.0));
        let expected = format!("{}{}|2|12345.0|1", out.display(), MAIN_SEPARATOR);
        assert_eq!(MacroEncoder::parameter_string(&with_scale), expected);

        let without_scale = job(&source, &image, &out, None);
        assert!(MacroEncoder::parameter_string(&without_scale).ends_with("|2|0.0|0"));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_interpreter_and_checks_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.tif");
        std::fs::write(&source, b"tiff").unwrap();
        let out = dir.path().join("cut");
        std::fs::create_dir(&out).unwrap();

        // Copies the source into the output directory named in the parameters
        let script = dir.path().join("copy.sh");
        std::fs::write(&script, "cp \"$1\" \"${2%%|*}\"\n").unwrap();

        let image = DynamicImage::ImageLuma8(GrayImage::new(4, 10));
        let encoder = MacroEncoder::new(PathBuf::from("sh"), script.clone(), Vec::new());
        let written = encoder.encode(&job(&source, &image, &out, Some(1.5))).unwrap();
        assert_eq!(written, out.join("a.tif"));
        assert!(written.is_file());

        // A script that writes nothing is an encoder failure
        let noop = dir.path().join("noop.sh");
        std::fs::write(&noop, "exit 0\n").unwrap();
        let other = dir.path().join("b.tif");
        std::fs::write(&other, b"tiff").unwrap();
        let encoder = MacroEncoder::new(PathBuf::from("sh"), noop, Vec::new());
        assert!(matches!(
            encoder.encode(&job(&other, &image, &out, None)),
            Err(ScaleError::EncoderFailed(_))
        ));

        let failing = dir.path().join("fail.sh");
        std::fs::write(&failing, "echo broken >&2\nexit 3\n").unwrap();
        let encoder = MacroEncoder::new(PathBuf::from("sh"), failing, Vec::new());
        assert!(matches!(
            encoder.encode(&job(&other, &image, &out, None)),
            Err(ScaleError::EncoderFailed(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_output_from_earlier_run_does_not_count() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.tif");
        std::fs::write(&source, b"tiff").unwrap();
        let out = dir.path().join("cut");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("a.tif"), b"previous run").unwrap();

        let noop = dir.path().join("noop.sh");
        std::fs::write(&noop, "exit 0\n").unwrap();

        let image = DynamicImage::ImageLuma8(GrayImage::new(4, 10));
        let encoder = MacroEncoder::new(PathBuf::from("sh"), noop, Vec::new());
        assert!(matches!(
            encoder.encode(&job(&source, &image, &out, Some(1.5))),
            Err(ScaleError::EncoderFailed(_))
        ));
        assert!(!out.join("a.tif").exists());
    }
}
