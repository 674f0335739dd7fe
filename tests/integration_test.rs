//! Integration tests for batch processing of SEM image directories

use std::fs;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use image::GrayImage;

use semcrop::batch::BatchSettings;
use semcrop::tiff::constants::tags;
use semcrop::tiff::{OutputCompression, TiffBuilder};
use semcrop::utils::logger::Logger;
use semcrop::{MetadataScanner, ScaleError, SemCrop};

/// Write a grayscale TIFF carrying an FEI metadata block
fn write_sem_tiff(path: &Path, width: u32, height: u32, metadata: Option<&str>) {
    let logger = Logger::disabled();
    let image = GrayImage::from_fn(width, height, |x, y| {
        // Bright info bar at the bottom so cropping is visible
        if y >= height.saturating_sub(10) { image::Luma([255]) } else { image::Luma([(x % 200) as u8]) }
    });

    let mut builder = TiffBuilder::new(&logger);
    builder.set_gray_image(&image, OutputCompression::None).unwrap();
    if let Some(text) = metadata {
        builder.add_ascii_tag(tags::FEI_METADATA, text);
    }
    builder.write(path).unwrap();
}

fn fei_block(pixel_width: &str, resolution_y: u32) -> String {
    format!("[Scan]\r\nPixelWidth={}\r\n[Image]\r\nResolutionY={}\r\n", pixel_width, resolution_y)
}

/// X resolution rational of a TIFF written by this crate
fn read_x_resolution(path: &Path) -> Option<(u32, u32)> {
    let bytes = fs::read(path).unwrap();
    let mut cursor = Cursor::new(&bytes[..]);
    cursor.set_position(4);
    let ifd_offset = cursor.read_u32::<LittleEndian>().unwrap();
    cursor.set_position(ifd_offset as u64);

    let count = cursor.read_u16::<LittleEndian>().unwrap();
    for _ in 0..count {
        let tag = cursor.read_u16::<LittleEndian>().unwrap();
        let _field_type = cursor.read_u16::<LittleEndian>().unwrap();
        let _count = cursor.read_u32::<LittleEndian>().unwrap();
        let offset = cursor.read_u32::<LittleEndian>().unwrap();
        if tag == tags::X_RESOLUTION {
            let mut value = Cursor::new(&bytes[offset as usize..]);
            return Some((value.read_u32::<LittleEndian>().unwrap(),
                         value.read_u32::<LittleEndian>().unwrap()));
        }
    }
    None
}

#[test]
fn test_batch_crops_and_sorts_by_pixel_size() {
    let dir = tempfile::tempdir().unwrap();
    write_sem_tiff(&dir.path().join("a.tif"), 64, 50, Some(&fei_block("1.2345e-05", 40)));
    write_sem_tiff(&dir.path().join("b.tif"), 64, 50, Some(&fei_block("2.5e-09", 40)));

    let report = SemCrop::without_log()
        .process_directory(dir.path(), &BatchSettings::default())
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(report.failures.is_empty());
    assert_eq!(report.relocated, 2);
    assert!(report.csv_path.is_none());

    let out = dir.path().join("cut");
    let a = out.join("12345.0nm").join("a.tif");
    let b = out.join("2.5nm").join("b.tif");
    assert!(a.is_file());
    assert!(b.is_file());
    assert!(!out.join("a.tif").exists());
    assert!(!out.join("scaling.csv").exists());

    let cropped = image::open(&a).unwrap();
    assert_eq!((cropped.width(), cropped.height()), (64, 40));
    // The info bar was the only bright region
    assert!(cropped.to_luma8().pixels().all(|p| p.0[0] < 255));

    assert_eq!(read_x_resolution(&a), Some((1, 12345)));
    assert_eq!(read_x_resolution(&b), Some((2, 5)));
}

#[test]
fn test_batch_without_metadata_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_sem_tiff(&dir.path().join("a.tif"), 64, 80, None);
    fs::write(dir.path().join("b.tif"), b"not an image").unwrap();

    let result = SemCrop::without_log().process_directory(dir.path(), &BatchSettings::default());

    assert!(matches!(result, Err(ScaleError::NoMetadataInBatch(_))));
    assert!(!dir.path().join("cut").exists());
}

#[test]
fn test_result_table_without_sorting() {
    let dir = tempfile::tempdir().unwrap();
    write_sem_tiff(&dir.path().join("a.tif"), 64, 50, Some(&fei_block("1.2345e-05", 40)));
    write_sem_tiff(&dir.path().join("plain.tif"), 64, 80, None);

    let settings = BatchSettings {
        sort_by_pixel_size: false,
        create_result_csv: true,
        ..BatchSettings::default()
    };
    let report = SemCrop::without_log().process_directory(dir.path(), &settings).unwrap();

    let out = dir.path().join("cut");
    assert_eq!(report.csv_path.as_deref(), Some(out.join("scaling.csv").as_path()));
    assert_eq!(report.relocated, 0);

    let table = fs::read_to_string(out.join("scaling.csv")).unwrap();
    assert_eq!(table, "a.tif,12345.0,10\nplain.tif,0.0,63\n");

    // Files without a pixel size get the fallback info bar and no scale
    let plain = out.join("plain.tif");
    let cropped = image::open(&plain).unwrap();
    assert_eq!((cropped.width(), cropped.height()), (64, 17));
    assert_eq!(read_x_resolution(&plain), None);
    assert!(out.join("a.tif").is_file());
}

#[test]
fn test_unscaled_files_stay_in_output_root() {
    let dir = tempfile::tempdir().unwrap();
    write_sem_tiff(&dir.path().join("a.tif"), 64, 50, Some(&fei_block("1.2345e-05", 40)));
    write_sem_tiff(&dir.path().join("plain.tif"), 64, 80, None);

    let report = SemCrop::without_log()
        .process_directory(dir.path(), &BatchSettings::default())
        .unwrap();

    assert_eq!(report.relocated, 1);
    let out = dir.path().join("cut");
    assert!(out.join("12345.0nm").join("a.tif").is_file());
    assert!(out.join("plain.tif").is_file());
}

#[test]
fn test_broken_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_sem_tiff(&dir.path().join("a.tif"), 64, 50, Some(&fei_block("1.2345e-05", 40)));
    // Metadata but no decodable image
    fs::write(dir.path().join("b.tif"), fei_block("1.2345e-05", 40)).unwrap();
    write_sem_tiff(&dir.path().join("c.tif"), 64, 50, Some(&fei_block("garbage", 40)));
    write_sem_tiff(&dir.path().join("d.tif"), 64, 50, Some(&fei_block("1e-09", 40)));

    let report = SemCrop::without_log()
        .process_directory(dir.path(), &BatchSettings::default())
        .unwrap();

    let processed: Vec<&str> = report.results.rows().iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(processed, vec!["a.tif", "d.tif"]);

    let skipped: Vec<&str> = report.failures.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(skipped, vec!["b.tif", "c.tif"]);

    let out = dir.path().join("cut");
    assert!(out.join("12345.0nm").join("a.tif").is_file());
    assert!(out.join("1.0nm").join("d.tif").is_file());
    assert!(!out.join("b.tif").exists());
    assert!(!out.join("c.tif").exists());
}

#[test]
fn test_rerun_replaces_outputs() {
    let dir = tempfile::tempdir().unwrap();
    write_sem_tiff(&dir.path().join("a.tif"), 64, 50, Some(&fei_block("1.2345e-05", 40)));

    let api = SemCrop::without_log();
    api.process_directory(dir.path(), &BatchSettings::default()).unwrap();
    let report = api.process_directory(dir.path(), &BatchSettings::default()).unwrap();

    assert_eq!(report.relocated, 1);
    let bucket = dir.path().join("cut").join("12345.0nm");
    let entries: Vec<_> = fs::read_dir(&bucket).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_deflate_outputs_keep_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("a.tif");
    write_sem_tiff(&source, 64, 50, Some(&fei_block("1.2345e-05", 40)));

    let settings = BatchSettings {
        compression: OutputCompression::Deflate,
        sort_by_pixel_size: false,
        ..BatchSettings::default()
    };
    SemCrop::without_log().process_directory(dir.path(), &settings).unwrap();

    let original = image::open(&source).unwrap().to_luma8();
    let cropped = image::open(dir.path().join("cut").join("a.tif")).unwrap().to_luma8();
    assert_eq!(cropped.dimensions(), (64, 40));
    for (x, y, pixel) in cropped.enumerate_pixels() {
        assert_eq!(pixel, original.get_pixel(x, y));
    }
}

#[test]
fn test_inspect_reads_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.tif");
    write_sem_tiff(&path, 64, 50, Some(&fei_block("1.2345e-05", 40)));

    let api = SemCrop::without_log();
    let record = api.inspect(&path).unwrap();
    assert_eq!(record.pixel_size_nm, Some(12345.0));
    assert_eq!(record.content_height_px, Some(40.0));
    assert_eq!(MetadataScanner::pixel_size(&path).unwrap(), Some(12345.0));

    let description = api.describe(&path, None).unwrap();
    assert!(description.contains("Dimensions: 64x50"));
    assert!(description.contains("Pixel size: 12345 nm"));
    assert!(description.contains("Cropped size: 64x40"));
    assert!(api.precheck(dir.path()));
}

#[test]
fn test_output_directory_must_be_plain_name() {
    let dir = tempfile::tempdir().unwrap();
    write_sem_tiff(&dir.path().join("a.tif"), 64, 50, Some(&fei_block("1.2345e-05", 40)));

    let settings = BatchSettings {
        output_directory: "../elsewhere".to_string(),
        ..BatchSettings::default()
    };
    assert!(matches!(
        SemCrop::without_log().process_directory(dir.path(), &settings),
        Err(ScaleError::Config(_))));
}

#[test]
fn test_directory_with_only_jpegs_processes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    // Passes the precheck, but only TIFFs are cropped
    fs::write(dir.path().join("a.jpg"), fei_block("1.2345e-05", 40)).unwrap();

    let report = SemCrop::without_log()
        .process_directory(dir.path(), &BatchSettings::default())
        .unwrap();

    assert!(report.results.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(report.relocated, 0);
}
