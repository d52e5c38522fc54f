//! Input frames.
//!
//! A [`SampleBuffer`] is a row-major grid whose first two axes are
//! (height, width). Any further axes are folded into the row, so a
//! `(h, w, 3)` frame is written as `h` rows of `w * 3` samples.

use std::fmt;

use serde::Serialize;

use crate::error::DngError;

/// Element type of a frame's samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    U8,
    U16,
    U32,
    F32,
    F64,
}

impl ElementType {
    /// Size of one sample in bytes.
    pub const fn size_in_bytes(self) -> usize {
        match self {
            ElementType::U8 => 1,
            ElementType::U16 => 2,
            ElementType::U32 | ElementType::F32 => 4,
            ElementType::F64 => 8,
        }
    }

    /// Whether frames of this type can be written as DNG samples.
    pub const fn is_convertible(self) -> bool {
        matches!(self, ElementType::U16 | ElementType::F32)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Owned sample storage, tagged by element type.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl SampleData {
    pub fn element_type(&self) -> ElementType {
        match self {
            SampleData::U8(_) => ElementType::U8,
            SampleData::U16(_) => ElementType::U16,
            SampleData::U32(_) => ElementType::U32,
            SampleData::F32(_) => ElementType::F32,
            SampleData::F64(_) => ElementType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SampleData::U8(v) => v.len(),
            SampleData::U16(v) => v.len(),
            SampleData::U32(v) => v.len(),
            SampleData::F32(v) => v.len(),
            SampleData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! impl_from_vec {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl From<Vec<$ty>> for SampleData {
                fn from(samples: Vec<$ty>) -> Self {
                    SampleData::$variant(samples)
                }
            }
        )*
    };
}

impl_from_vec!(u8 => U8, u16 => U16, u32 => U32, f32 => F32, f64 => F64);

// =============================================================================
// SampleBuffer
// =============================================================================

/// An immutable frame of samples with its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    shape: Vec<usize>,
    data: SampleData,
}

impl SampleBuffer {
    /// Create a frame, checking that `shape` accounts for every sample.
    ///
    /// # Errors
    /// - `InvalidFrame` if `shape` is empty or its product differs from the
    ///   sample count
    pub fn new(shape: impl Into<Vec<usize>>, data: impl Into<SampleData>) -> Result<Self, DngError> {
        let shape = shape.into();
        let data = data.into();

        let expected = if shape.is_empty() {
            0
        } else {
            shape.iter().product()
        };
        if shape.is_empty() || expected != data.len() {
            return Err(DngError::InvalidFrame {
                shape,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { shape, data })
    }

    /// A 2-D frame of u16 samples.
    pub fn from_u16(height: usize, width: usize, samples: Vec<u16>) -> Result<Self, DngError> {
        Self::new(vec![height, width], samples)
    }

    /// A 2-D frame of f32 samples.
    pub fn from_f32(height: usize, width: usize, samples: Vec<f32>) -> Result<Self, DngError> {
        Self::new(vec![height, width], samples)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn data(&self) -> &SampleData {
        &self.data
    }

    pub fn into_data(self) -> SampleData {
        self.data
    }

    /// (height, width), or `None` for frames of rank below 2.
    pub fn dims(&self) -> Option<(usize, usize)> {
        match self.shape.as_slice() {
            [height, width, ..] => Some((*height, *width)),
            _ => None,
        }
    }

    /// Samples per row, including any folded trailing axes.
    pub fn row_len(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    /// Product of the axes beyond (height, width).
    pub fn trailing_len(&self) -> usize {
        self.shape.iter().skip(2).product()
    }

    pub fn as_u16(&self) -> Option<&[u16]> {
        match &self.data {
            SampleData::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            SampleData::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Apply `f` to every u16 sample, keeping the shape.
    ///
    /// Returns `None` for non-u16 frames.
    pub fn map_u16(&self, f: impl Fn(u16) -> u16) -> Option<Self> {
        let samples = self.as_u16()?;
        Some(Self {
            shape: self.shape.clone(),
            data: SampleData::U16(samples.iter().map(|&s| f(s)).collect()),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
