//! Metadata validation for the main raw directory.
//!
//! Two levels of checking happen here:
//!
//! - **Hard requirements** ([`validate_tags`]): the tags every conversion
//!   needs (width, length, bits per sample) must be present, and nothing may
//!   collide with a tag the encoder injects. Violations are errors and are
//!   raised when a converter is configured, not when it converts.
//!
//! - **Lints** ([`lint_tags`]): combinations that produce a readable but
//!   probably unintended file, such as a white level above what the bit depth
//!   can hold. These are collected as warnings and only logged.

use crate::error::DngError;

use super::entries::DngTags;
use super::tags::{DngTag, PhotometricInterpretation};

/// Tags that must be configured before any conversion.
pub const REQUIRED_TAGS: [DngTag; 3] = [
    DngTag::ImageWidth,
    DngTag::ImageLength,
    DngTag::BitsPerSample,
];

// =============================================================================
// Image Geometry
// =============================================================================

/// Frame geometry declared by the configured metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
}

impl ImageGeometry {
    /// Read geometry from a tag set that already passed [`validate_tags`].
    pub fn from_tags(tags: &DngTags) -> Result<Self, DngError> {
        let width = tags
            .get_u32(DngTag::ImageWidth)
            .ok_or(DngError::MissingRequiredTag("ImageWidth"))?;
        let height = tags
            .get_u32(DngTag::ImageLength)
            .ok_or(DngError::MissingRequiredTag("ImageLength"))?;
        let bits = tags
            .get_u32(DngTag::BitsPerSample)
            .ok_or(DngError::MissingRequiredTag("BitsPerSample"))?;

        Ok(Self {
            width,
            height,
            // BitsPerSample is cataloged as SHORT, so this cannot truncate
            bits_per_sample: bits as u16,
        })
    }

    /// (height, width) in frame axis order.
    pub fn frame_dims(&self) -> (usize, usize) {
        (self.height as usize, self.width as usize)
    }
}

// =============================================================================
// Hard Requirements
// =============================================================================

/// Check that `tags` can configure a converter.
///
/// # Errors
/// - `MissingRequiredTag` naming the first absent tag of [`REQUIRED_TAGS`]
/// - `ReservedTagConflict` if a tag collides with one the encoder writes
pub fn validate_tags(tags: &DngTags) -> Result<ImageGeometry, DngError> {
    for tag in REQUIRED_TAGS {
        if !tags.contains(tag) {
            return Err(DngError::MissingRequiredTag(tag.name()));
        }
    }
    tags.check_reserved()?;
    ImageGeometry::from_tags(tags)
}

// =============================================================================
// Lints
// =============================================================================

/// Result of linting a tag set.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Non-fatal findings, in the order they were detected
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Look for metadata combinations that readers accept but rarely intend.
pub fn lint_tags(tags: &DngTags, geometry: &ImageGeometry) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if let Some(rows) = tags.get_u32(DngTag::RowsPerStrip) {
        if rows != geometry.height {
            result.add_warning(format!(
                "RowsPerStrip is {} but the image is written as one strip of {} rows",
                rows, geometry.height
            ));
        }
    }

    if let Some(white) = tags.get_u32(DngTag::WhiteLevel) {
        let bits = geometry.bits_per_sample;
        if bits < 32 && u64::from(white) > (1u64 << bits) - 1 {
            result.add_warning(format!(
                "WhiteLevel {} exceeds the {}-bit sample range",
                white, bits
            ));
        }
    }

    if let Some(black) = tags.get_u32(DngTag::BlackLevel) {
        if let Some(white) = tags.get_u32(DngTag::WhiteLevel) {
            if black >= white {
                result.add_warning(format!(
                    "BlackLevel {} is not below WhiteLevel {}",
                    black, white
                ));
            }
        }
    }

    // CFA pattern length must match the repeat dimensions
    let dims = tags
        .get(DngTag::CfaRepeatPatternDim)
        .and_then(|v| v.as_u32s());
    let pattern_len = tags.get(DngTag::CfaPattern).map(|v| v.count());
    match (dims, pattern_len) {
        (Some(dims), Some(len)) if dims.len() == 2 => {
            let expected = (dims[0] * dims[1]) as usize;
            if expected != len {
                result.add_warning(format!(
                    "CFAPattern has {} entries but CFARepeatPatternDim is {}x{}",
                    len, dims[0], dims[1]
                ));
            }
        }
        (None, Some(_)) => {
            result.add_warning("CFAPattern is set without CFARepeatPatternDim".to_string());
        }
        _ => {}
    }

    if tags.get_u32(DngTag::PhotometricInterpretation)
        == Some(PhotometricInterpretation::ColorFilterArray as u32)
        && !tags.contains(DngTag::CfaPattern)
    {
        result.add_warning(
            "PhotometricInterpretation is CFA but no CFAPattern is configured".to_string(),
        );
    }

    result
}

// =============================================================================
// Tests
// =============================================================================
