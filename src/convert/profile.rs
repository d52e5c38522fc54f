//! Camera metadata sources.
//!
//! A converter can be configured from an explicit [`DngTags`] set or from
//! anything implementing [`CameraModel`]. [`CameraProfile`] is the built-in
//! model: a JSON document describing the sensor and its colour calibration.
//!
//! ```json
//! {
//!   "make": "Raspberry Pi",
//!   "model": "HQ Camera",
//!   "width": 4056,
//!   "height": 3040,
//!   "bits_per_sample": 12,
//!   "cfa_pattern": "BGGR",
//!   "color_matrix1": [[6759, 10000], [-2104, 10000], [-684, 10000],
//!                     [-3786, 10000], [10836, 10000], [2950, 10000],
//!                     [-940, 10000], [1566, 10000], [5291, 10000]],
//!   "calibration_illuminant1": "D65",
//!   "as_shot_neutral": [[5022, 10000], [1, 1], [5571, 10000]],
//!   "black_level": 256,
//!   "white_level": 4095
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DngError;
use crate::format::tiff::{
    CalibrationIlluminant, CfaPattern, DngTag, DngTags, PhotometricInterpretation,
};

/// Anything that can supply a complete DNG tag set for its sensor.
pub trait CameraModel {
    /// Tags describing this camera's frames.
    fn tags(&self) -> Result<DngTags, DngError>;
}

impl CameraModel for DngTags {
    fn tags(&self) -> Result<DngTags, DngError> {
        Ok(self.clone())
    }
}

/// ResolutionUnit value for inches.
const RESOLUTION_UNIT_INCH: u32 = 2;

/// Sensor description loaded from JSON.
///
/// Geometry may be left out of the file and supplied later with
/// [`with_geometry`](CameraProfile::with_geometry), which lets one profile
/// serve several capture modes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraProfile {
    pub make: Option<String>,
    pub model: Option<String>,
    pub unique_camera_model: Option<String>,
    pub serial_number: Option<String>,

    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bits_per_sample: Option<u16>,

    /// Bayer layout; omitted for monochrome sensors
    pub cfa_pattern: Option<CfaPattern>,

    pub color_matrix1: Option<Vec<(i32, i32)>>,
    pub color_matrix2: Option<Vec<(i32, i32)>>,
    pub forward_matrix1: Option<Vec<(i32, i32)>>,
    pub forward_matrix2: Option<Vec<(i32, i32)>>,
    pub calibration_illuminant1: Option<CalibrationIlluminant>,
    pub calibration_illuminant2: Option<CalibrationIlluminant>,
    pub as_shot_neutral: Option<Vec<(u32, u32)>>,
    pub baseline_exposure: Option<(i32, i32)>,

    pub black_level: Option<u32>,
    pub white_level: Option<u32>,

    /// Pixels per inch, as a rational
    pub resolution: Option<(u32, u32)>,
}

impl CameraProfile {
    /// Parse a profile from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DngError> {
        serde_json::from_str(json).map_err(|e| DngError::InvalidProfile(e.to_string()))
    }

    /// Read and parse a profile file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DngError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Override the sensor geometry.
    pub fn with_geometry(mut self, width: u32, height: u32, bits_per_sample: u16) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self.bits_per_sample = Some(bits_per_sample);
        self
    }

    fn unique_model_name(&self) -> Option<String> {
        if let Some(name) = &self.unique_camera_model {
            return Some(name.clone());
        }
        match (&self.make, &self.model) {
            (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
            (None, Some(model)) => Some(model.clone()),
            (Some(make), None) => Some(make.clone()),
            (None, None) => None,
        }
    }
}

impl CameraModel for CameraProfile {
    fn tags(&self) -> Result<DngTags, DngError> {
        let mut tags = DngTags::new();

        if let Some(width) = self.width {
            tags.set_u32(DngTag::ImageWidth, width)?;
        }
        if let Some(height) = self.height {
            tags.set_u32(DngTag::ImageLength, height)?;
            tags.set_u32(DngTag::RowsPerStrip, height)?;
        }
        if let Some(bits) = self.bits_per_sample {
            tags.set_u32(DngTag::BitsPerSample, bits.into())?;
        }
        tags.set_u32(DngTag::SamplesPerPixel, 1)?;

        match self.cfa_pattern {
            Some(pattern) => {
                tags.set_u32(
                    DngTag::PhotometricInterpretation,
                    PhotometricInterpretation::ColorFilterArray as u32,
                )?;
                tags.set_u32s(DngTag::CfaRepeatPatternDim, &[2, 2])?;
                tags.set_bytes(DngTag::CfaPattern, &pattern.bytes())?;
            }
            None => {
                tags.set_u32(
                    DngTag::PhotometricInterpretation,
                    PhotometricInterpretation::LinearRaw as u32,
                )?;
            }
        }

        if let Some(make) = &self.make {
            tags.set_ascii(DngTag::Make, make)?;
        }
        if let Some(model) = &self.model {
            tags.set_ascii(DngTag::Model, model)?;
        }
        if let Some(name) = self.unique_model_name() {
            tags.set_ascii(DngTag::UniqueCameraModel, &name)?;
        }
        if let Some(serial) = &self.serial_number {
            tags.set_ascii(DngTag::CameraSerialNumber, serial)?;
        }

        let matrices = [
            (DngTag::ColorMatrix1, &self.color_matrix1),
            (DngTag::ColorMatrix2, &self.color_matrix2),
            (DngTag::ForwardMatrix1, &self.forward_matrix1),
            (DngTag::ForwardMatrix2, &self.forward_matrix2),
        ];
        for (tag, matrix) in matrices {
            if let Some(matrix) = matrix {
                tags.set_srationals(tag, matrix)?;
            }
        }

        if let Some(illuminant) = self.calibration_illuminant1 {
            tags.set_u32(DngTag::CalibrationIlluminant1, illuminant as u32)?;
        }
        if let Some(illuminant) = self.calibration_illuminant2 {
            tags.set_u32(DngTag::CalibrationIlluminant2, illuminant as u32)?;
        }
        if let Some(neutral) = &self.as_shot_neutral {
            tags.set_rationals(DngTag::AsShotNeutral, neutral)?;
        }
        if let Some(exposure) = self.baseline_exposure {
            tags.set_srationals(DngTag::BaselineExposure, &[exposure])?;
        }

        if let Some(black) = self.black_level {
            tags.set_u32(DngTag::BlackLevel, black)?;
        }
        if let Some(white) = self.white_level {
            tags.set_u32(DngTag::WhiteLevel, white)?;
        }

        if let Some(resolution) = self.resolution {
            tags.set_rationals(DngTag::XResolution, &[resolution])?;
            tags.set_rationals(DngTag::YResolution, &[resolution])?;
            tags.set_u32(DngTag::ResolutionUnit, RESOLUTION_UNIT_INCH)?;
        }

        Ok(tags)
    }
}

// =============================================================================
// Tests
// =============================================================================
