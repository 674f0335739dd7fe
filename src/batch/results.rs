//! Per-file results of a batch run

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use log::info;

use crate::errors::{ScaleError, ScaleResult};
use crate::utils::format_utils::format_pixel_size;

/// One processed file
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub filename: String,
    /// Pixel size in nm, `0` if the file had none
    pub pixel_size_nm: f64,
    pub info_bar_height_px: u32,
}

impl ResultRow {
    /// Row as written to the result table
    pub fn to_csv_line(&self) -> String {
        format!("{},{},{}", self.filename, format_pixel_size(self.pixel_size_nm), self.info_bar_height_px)
    }
}

/// Rows of a run in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResults {
    rows: Vec<ResultRow>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write all rows as header-less `filename,pixelSizeNm,infoBarHeight` lines
    pub fn write_to(&self, writer: &mut impl Write) -> ScaleResult<()> {
        for row in &self.rows {
            writeln!(writer, "{}", row.to_csv_line())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the result table to `path`, replacing an existing file
    pub fn write_csv(&self, path: &Path) -> ScaleResult<()> {
        info!("writing result CSV: {}", path.display());
        let file = File::create(path).map_err(|e| ScaleError::filesystem(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully written files
    pub results: BatchResults,
    /// Files that were skipped, with the reason
    pub failures: Vec<(String, String)>,
    /// Number of files moved into scale subdirectories
    pub relocated: usize,
    /// Location of the result table if one was written
    pub csv_path: Option<PathBuf>,
}

impl BatchReport {
    /// One-line summary for the log
    pub fn summary(&self) -> String {
        format!("{} files processed, {} skipped, {} sorted by pixel size",
                self.results.len(), self.failures.len(), self.relocated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, size: f64, bar: u32) -> ResultRow {
        ResultRow { filename: name.to_string(), pixel_size_nm: size, info_bar_height_px: bar }
    }

    #[test]
    fn test_csv_lines_keep_order() {
        let mut results = BatchResults::new();
        results.push(row("b.tif", 12345.0, 63));
        results.push(row("a.tif", 0.0, 63));
        results.push(row("c.tif", 1.234, 90));

        let mut out = Vec::new();
        results.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(),
                   "b.tif,12345.0,63\na.tif,0.0,63\nc.tif,1.234,90\n");
    }

    #[test]
    fn test_write_csv_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaling.csv");
        std::fs::write(&path, "old content that is longer\n").unwrap();

        let mut results = BatchResults::new();
        results.push(row("a.tif", 2.5, 63));
        results.write_csv(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a.tif,2.5,63\n");
    }

    #[test]
    fn test_empty_table() {
        let results = BatchResults::new();
        assert!(results.is_empty());

        let mut out = Vec::new();
        results.write_to(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
