//! In-process scale encoder

use std::path::PathBuf;
use log::{debug, info};

use crate::encoder::{encode_scale, EncodeJob, ScaleEncoder, NANOMETER_UNIT};
use crate::errors::ScaleResult;
use crate::tiff::{OutputCompression, TiffBuilder};
use crate::transform::crop_info_bar;
use crate::utils::fs_utils;
use crate::utils::logger::Logger;

/// Crops, converts and writes the TIFF with the crate's own writer
pub struct DirectEncoder<'a> {
    logger: &'a Logger,
    compression: OutputCompression,
}

impl<'a> DirectEncoder<'a> {
    pub fn new(logger: &'a Logger, compression: OutputCompression) -> Self {
        DirectEncoder { logger, compression }
    }
}

impl<'a> ScaleEncoder for DirectEncoder<'a> {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn encode(&self, job: &EncodeJob) -> ScaleResult<PathBuf> {
        let gray = crop_info_bar(job.image, &job.geometry);

        let mut builder = TiffBuilder::new(self.logger);
        builder.set_gray_image(&gray, self.compression)?;

        match job.pixel_size_nm {
            Some(pixel_size) => {
                let scale = encode_scale(pixel_size, NANOMETER_UNIT)?;
                builder.add_scale(&scale);
            }
            None => debug!("No pixel size for {}, writing without scale", job.source.display()),
        }
        builder.add_software();

        // Write next to the target and move into place once complete
        let output_path = job.output_path();
        let partial = fs_utils::partial_path(&output_path);
        if let Err(e) = builder.write(&partial) {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        if let Err(e) = fs_utils::replace_file(&partial, &output_path) {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }

        info!("Wrote {} ({}x{})", output_path.display(), gray.width(), gray.height());
        Ok(output_path)
    }
}
