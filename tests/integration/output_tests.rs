//! File output and on-disk profile tests.
//!
//! Tests verify:
//! - Named files land under the output directory with a `.dng` extension
//! - File contents equal the buffered conversion
//! - Failed writes surface as I/O errors and leave no partial file
//! - Camera profiles load from JSON files

use std::fs;

use raw2dng::{
    CameraProfile, ConvertOutput, Destination, DngConverter, DngError, DngTag, TagValue,
};
use tempfile::TempDir;

use super::test_utils::{bayer_tags, gradient_u16, parse};

fn partial_files(dir: &TempDir) -> Vec<String> {
    fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".partial"))
        .collect()
}

// =============================================================================
// Named Files
// =============================================================================

#[test]
fn test_file_matches_buffer() {
    let dir = TempDir::new().unwrap();
    let conv = DngConverter::new(bayer_tags(16, 4, 12), dir.path()).unwrap();
    let frame = gradient_u16(4, 16, 12);

    let path = conv.to_file(&frame, "capture").unwrap();
    assert_eq!(path, dir.path().join("capture.dng"));

    let written = fs::read(&path).unwrap();
    assert_eq!(written, conv.to_bytes(&frame).unwrap().to_vec());
    assert!(partial_files(&dir).is_empty());
}

#[test]
fn test_existing_extension_kept() {
    let dir = TempDir::new().unwrap();
    let conv = DngConverter::new(bayer_tags(4, 2, 16), dir.path()).unwrap();

    let path = conv.to_file(&gradient_u16(2, 4, 16), "frame.DNG").unwrap();
    assert_eq!(path, dir.path().join("frame.DNG"));
    assert!(path.exists());
}

#[test]
fn test_file_destination() {
    let dir = TempDir::new().unwrap();
    let conv = DngConverter::new(bayer_tags(8, 2, 10), dir.path()).unwrap();

    let output = conv
        .convert(&gradient_u16(2, 8, 10), Destination::File("shot_0001"))
        .unwrap();
    let ConvertOutput::Path(path) = output else {
        panic!("expected a path, got {:?}", output);
    };

    let bytes = fs::read(&path).unwrap();
    let file = parse(&bytes);
    assert_eq!(file.ifds[0].get_u32(DngTag::BitsPerSample), Some(10));
}

#[test]
fn test_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("again.dng"), b"stale").unwrap();

    let conv = DngConverter::new(bayer_tags(4, 2, 14), dir.path()).unwrap();
    let path = conv.to_file(&gradient_u16(2, 4, 14), "again").unwrap();

    let bytes = fs::read(path).unwrap();
    assert_ne!(bytes, b"stale");
    parse(&bytes);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does").join("not").join("exist");
    let conv = DngConverter::new(bayer_tags(4, 2, 16), &missing).unwrap();

    let result = conv.to_file(&gradient_u16(2, 4, 16), "capture");
    assert!(matches!(result, Err(DngError::Io(_))));
    assert!(!missing.exists());
    assert!(partial_files(&dir).is_empty());
}

#[test]
fn test_empty_name_is_io_error() {
    let dir = TempDir::new().unwrap();
    let conv = DngConverter::new(bayer_tags(4, 2, 16), dir.path()).unwrap();

    let result = conv.to_file(&gradient_u16(2, 4, 16), "");
    match result {
        Err(DngError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidInput),
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
fn test_frame_error_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let conv = DngConverter::new(bayer_tags(4, 2, 16), dir.path()).unwrap();

    let result = conv.to_file(&gradient_u16(3, 4, 16), "capture");
    assert!(matches!(result, Err(DngError::ShapeMismatch { .. })));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

// =============================================================================
// Profiles
// =============================================================================

#[test]
fn test_profile_from_file() {
    let dir = TempDir::new().unwrap();
    let profile_path = dir.path().join("sensor.json");
    fs::write(
        &profile_path,
        r#"{
            "make": "Acme",
            "model": "Bench Sensor",
            "width": 6,
            "height": 2,
            "bits_per_sample": 14,
            "cfa_pattern": "RGGB",
            "calibration_illuminant1": "D65",
            "as_shot_neutral": [[5022, 10000], [1, 1], [5571, 10000]],
            "white_level": 16383
        }"#,
    )
    .unwrap();

    let profile = CameraProfile::load(&profile_path).unwrap();
    let conv = DngConverter::from_model(&profile, dir.path()).unwrap();
    let path = conv.to_file(&gradient_u16(2, 6, 14), "bench").unwrap();

    let bytes = fs::read(path).unwrap();
    let file = parse(&bytes);
    let ifd = &file.ifds[0];
    assert_eq!(ifd.get_u32(DngTag::ImageWidth), Some(6));
    assert_eq!(ifd.get_u32(DngTag::WhiteLevel), Some(16383));
    assert_eq!(
        ifd.get_entry_by_tag(DngTag::Make).unwrap().value,
        TagValue::Ascii("Acme".into())
    );
}

#[test]
fn test_profile_unknown_field_rejected() {
    let dir = TempDir::new().unwrap();
    let profile_path = dir.path().join("bad.json");
    fs::write(&profile_path, r#"{"make": "Acme", "lens": "50mm"}"#).unwrap();

    assert!(matches!(
        CameraProfile::load(&profile_path),
        Err(DngError::InvalidProfile(_))
    ));
}

#[test]
fn test_profile_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = CameraProfile::load(dir.path().join("absent.json"));
    assert!(result.is_err());
}
