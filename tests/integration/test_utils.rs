//! Test utilities for integration tests.
//!
//! Helpers for building tag sets and frames, and for reading produced files
//! back through the crate's own parser.

use raw2dng::{
    CalibrationIlluminant, CfaPattern, DngTag, DngTags, PhotometricInterpretation, SampleBuffer,
    TiffFile,
};

// =============================================================================
// Tag Sets
// =============================================================================

/// The three tags every converter needs.
pub fn base_tags(width: u32, height: u32, bits: u32) -> DngTags {
    let mut tags = DngTags::new();
    tags.set_u32(DngTag::ImageWidth, width).unwrap();
    tags.set_u32(DngTag::ImageLength, height).unwrap();
    tags.set_u32(DngTag::BitsPerSample, bits).unwrap();
    tags
}

/// A realistic Bayer tag set with colour calibration.
pub fn bayer_tags(width: u32, height: u32, bits: u32) -> DngTags {
    let color_matrix = [
        (16360618, 10000000),
        (-44861874, 100000000),
        (-1874430, 10000000),
        (-115164764, 1000000000),
        (14889708, 10000000),
        (-37380603, 100000000),
        (-4740228, 1000000000),
        (-32360125, 100000000),
        (13283415, 10000000),
    ];

    let mut tags = base_tags(width, height, bits);
    tags.set_u32(DngTag::SamplesPerPixel, 1).unwrap();
    tags.set_u32(
        DngTag::PhotometricInterpretation,
        PhotometricInterpretation::ColorFilterArray as u32,
    )
    .unwrap();
    tags.set_u32(DngTag::RowsPerStrip, height).unwrap();
    tags.set_u32s(DngTag::CfaRepeatPatternDim, &[2, 2]).unwrap();
    tags.set_bytes(DngTag::CfaPattern, &CfaPattern::Rggb.bytes())
        .unwrap();
    tags.set_srationals(DngTag::ColorMatrix1, &color_matrix)
        .unwrap();
    tags.set_srationals(DngTag::ColorMatrix2, &color_matrix)
        .unwrap();
    tags.set_u32(
        DngTag::CalibrationIlluminant1,
        CalibrationIlluminant::StandardLightA as u32,
    )
    .unwrap();
    tags.set_u32(DngTag::CalibrationIlluminant2, CalibrationIlluminant::D65 as u32)
        .unwrap();
    tags.set_rationals(DngTag::AsShotNeutral, &[(5022, 10000), (1, 1), (5571, 10000)])
        .unwrap();
    tags.set_u32(DngTag::BlackLevel, 0).unwrap();
    if bits < 32 {
        tags.set_u32(DngTag::WhiteLevel, (1u32 << bits) - 1).unwrap();
    }
    tags.set_rationals(DngTag::XResolution, &[(72, 1)]).unwrap();
    tags.set_ascii(DngTag::Make, "Acme").unwrap();
    tags.set_ascii(DngTag::Model, "Bench Sensor").unwrap();
    tags
}

// =============================================================================
// Frames
// =============================================================================

/// A deterministic u16 frame whose samples stay below `2^bits`.
pub fn gradient_u16(height: usize, width: usize, bits: u32) -> SampleBuffer {
    let max = if bits >= 16 { u16::MAX as usize } else { (1usize << bits) - 1 };
    let samples = (0..height * width)
        .map(|i| ((i * 37 + i / width * 11) % (max + 1)) as u16)
        .collect();
    SampleBuffer::from_u16(height, width, samples).unwrap()
}

/// A deterministic f32 frame.
pub fn gradient_f32(height: usize, width: usize) -> SampleBuffer {
    let samples = (0..height * width).map(|i| i as f32 / 7.0).collect();
    SampleBuffer::from_f32(height, width, samples).unwrap()
}

// =============================================================================
// Readers
// =============================================================================

/// Parse a produced file, panicking with context on failure.
pub fn parse(bytes: &[u8]) -> TiffFile {
    TiffFile::parse(bytes).expect("produced file should parse")
}

/// Payload of the single strip of the first directory.
pub fn single_strip(bytes: &[u8]) -> Vec<u8> {
    let file = parse(bytes);
    let strips = file.ifds[0].strips(bytes).expect("strips in bounds");
    assert_eq!(strips.len(), 1, "expected exactly one strip");
    strips[0].to_vec()
}

/// Tag ids of the first directory, in file order.
pub fn tag_ids(bytes: &[u8]) -> Vec<u16> {
    parse(bytes).ifds[0].entries.iter().map(|e| e.tag).collect()
}
