//! TIFF/DNG tag and field type definitions.
//!
//! This module defines the vocabulary for writing DNG containers:
//! - Field types that determine how values are encoded
//! - The tag catalog, which pins every known tag to a value kind and count
//! - Enumerated values used by the DNG specification

// =============================================================================
// TIFF Field Types
// =============================================================================

/// TIFF field types that determine how values are encoded.
///
/// Each field type has a fixed element size, which decides whether a value
/// fits inline in a 12-byte directory entry or needs an out-of-line blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer (1 byte)
    Byte = 1,

    /// 8-bit ASCII character, NUL terminated (1 byte)
    Ascii = 2,

    /// Unsigned 16-bit integer (2 bytes)
    Short = 3,

    /// Unsigned 32-bit integer (4 bytes)
    Long = 4,

    /// Two unsigned 32-bit integers: numerator, denominator (8 bytes)
    Rational = 5,

    /// Undefined byte data (1 byte per element)
    Undefined = 7,

    /// Two signed 32-bit integers: numerator, denominator (8 bytes)
    SRational = 10,
}

impl FieldType {
    /// Size of a single value of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::Undefined => 1,
            FieldType::Short => 2,
            FieldType::Long => 4,
            FieldType::Rational | FieldType::SRational => 8,
        }
    }

    /// Create a FieldType from its numeric value.
    ///
    /// Returns `None` for types the encoder never writes.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            7 => Some(FieldType::Undefined),
            10 => Some(FieldType::SRational),
            _ => None,
        }
    }

    /// Get the numeric type code.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Maximum bytes that can be stored inline in a classic TIFF IFD entry.
    pub const INLINE_THRESHOLD: usize = 4;

    /// Check if `count` values of this type fit in the inline value field.
    #[inline]
    pub fn fits_inline(self, count: u64) -> bool {
        self.size_in_bytes() as u64 * count <= Self::INLINE_THRESHOLD as u64
    }
}

// =============================================================================
// Tag Catalog
// =============================================================================

/// How many elements a tag value must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// Exactly this many elements
    Fixed(u32),

    /// One or more elements
    Any,
}

impl Count {
    /// Check an element count against this rule.
    pub fn admits(self, count: usize) -> bool {
        match self {
            Count::Fixed(n) => count == n as usize,
            Count::Any => count >= 1,
        }
    }
}

/// Declared encoding of a catalog tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    pub field_type: FieldType,
    pub count: Count,
}

const fn spec(field_type: FieldType, count: Count) -> TagSpec {
    TagSpec { field_type, count }
}

macro_rules! dng_tags {
    ($( $(#[$doc:meta])* $name:ident = $id:literal => $ty:ident, $count:expr; )*) => {
        /// TIFF, TIFF/EP and DNG tags the encoder knows how to write.
        ///
        /// Every tag carries a declared field type and element count. Values
        /// are checked against this table when they are added to a tag set,
        /// so a directory can never contain a tag with a mismatched encoding.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum DngTag {
            $( $(#[$doc])* $name = $id, )*
        }

        impl DngTag {
            /// Create a DngTag from its numeric value.
            ///
            /// Returns `None` for tags outside the catalog.
            pub fn from_u16(value: u16) -> Option<Self> {
                match value {
                    $( $id => Some(DngTag::$name), )*
                    _ => None,
                }
            }

            /// Declared field type and count.
            pub const fn spec(self) -> TagSpec {
                match self {
                    $( DngTag::$name => spec(FieldType::$ty, $count), )*
                }
            }

            /// Name as it appears in the TIFF/DNG specifications.
            pub const fn name(self) -> &'static str {
                match self {
                    $( DngTag::$name => stringify!($name), )*
                }
            }
        }
    };
}

dng_tags! {
    // -------------------------------------------------------------------------
    // Baseline TIFF
    // -------------------------------------------------------------------------
    /// Kind of image in this directory (0 = main image)
    NewSubfileType = 254 => Long, Count::Fixed(1);
    /// Image width in pixels
    ImageWidth = 256 => Long, Count::Fixed(1);
    /// Image height (length) in pixels
    ImageLength = 257 => Long, Count::Fixed(1);
    /// Bits per sample, one entry per sample plane
    BitsPerSample = 258 => Short, Count::Any;
    /// Compression scheme used
    Compression = 259 => Short, Count::Fixed(1);
    /// Photometric interpretation (CFA, LinearRaw, ...)
    PhotometricInterpretation = 262 => Short, Count::Fixed(1);
    /// Free-form description
    ImageDescription = 270 => Ascii, Count::Any;
    /// Camera manufacturer
    Make = 271 => Ascii, Count::Any;
    /// Camera model
    Model = 272 => Ascii, Count::Any;
    /// Byte offsets of strips
    StripOffsets = 273 => Long, Count::Any;
    /// Image orientation
    Orientation = 274 => Short, Count::Fixed(1);
    /// Number of components per pixel
    SamplesPerPixel = 277 => Short, Count::Fixed(1);
    /// Row count per strip
    RowsPerStrip = 278 => Long, Count::Fixed(1);
    /// Byte counts of strips
    StripByteCounts = 279 => Long, Count::Any;
    /// Pixels per unit in X direction
    XResolution = 282 => Rational, Count::Fixed(1);
    /// Pixels per unit in Y direction
    YResolution = 283 => Rational, Count::Fixed(1);
    /// How components are organized (chunky vs planar)
    PlanarConfiguration = 284 => Short, Count::Fixed(1);
    /// Unit of resolution (1=none, 2=inch, 3=centimeter)
    ResolutionUnit = 296 => Short, Count::Fixed(1);
    /// Name of the writing software
    Software = 305 => Ascii, Count::Any;
    /// Capture timestamp, "YYYY:MM:DD HH:MM:SS"
    DateTime = 306 => Ascii, Count::Any;
    /// Person who captured the image
    Artist = 315 => Ascii, Count::Any;
    /// Interpretation of sample values (uint, float)
    SampleFormat = 339 => Short, Count::Any;

    // -------------------------------------------------------------------------
    // TIFF/EP
    // -------------------------------------------------------------------------
    /// Dimensions of the CFA repeat pattern (rows, columns)
    CfaRepeatPatternDim = 33421 => Short, Count::Fixed(2);
    /// Color filter array pattern, one colour index per cell
    CfaPattern = 33422 => Byte, Count::Any;
    /// Copyright notice
    Copyright = 33432 => Ascii, Count::Any;
    /// Exposure time in seconds
    ExposureTime = 33434 => Rational, Count::Fixed(1);
    /// F number
    FNumber = 33437 => Rational, Count::Fixed(1);
    /// ISO speed ratings
    IsoSpeedRatings = 34855 => Short, Count::Any;
    /// Focal length in millimetres
    FocalLength = 37386 => Rational, Count::Fixed(1);

    // -------------------------------------------------------------------------
    // DNG
    // -------------------------------------------------------------------------
    /// DNG specification version the file conforms to
    DngVersion = 50706 => Byte, Count::Fixed(4);
    /// Oldest DNG version a reader must support
    DngBackwardVersion = 50707 => Byte, Count::Fixed(4);
    /// Unique, non-localized camera model name
    UniqueCameraModel = 50708 => Ascii, Count::Any;
    /// Localized camera model name
    LocalizedCameraModel = 50709 => Ascii, Count::Any;
    /// Colour of each CFA plane
    CfaPlaneColor = 50710 => Byte, Count::Any;
    /// Spatial layout of the CFA
    CfaLayout = 50711 => Short, Count::Fixed(1);
    /// Lookup table mapping stored values to linear values
    LinearizationTable = 50712 => Short, Count::Any;
    /// Repeat pattern size of BlackLevel (rows, columns)
    BlackLevelRepeatDim = 50713 => Short, Count::Fixed(2);
    /// Zero light encoding level
    BlackLevel = 50714 => Long, Count::Any;
    /// Fully saturated encoding level
    WhiteLevel = 50717 => Long, Count::Any;
    /// Default scale factors (horizontal, vertical)
    DefaultScale = 50718 => Rational, Count::Fixed(2);
    /// Origin of the final image area
    DefaultCropOrigin = 50719 => Long, Count::Fixed(2);
    /// Size of the final image area
    DefaultCropSize = 50720 => Long, Count::Fixed(2);
    /// XYZ to camera space matrix for the first illuminant
    ColorMatrix1 = 50721 => SRational, Count::Any;
    /// XYZ to camera space matrix for the second illuminant
    ColorMatrix2 = 50722 => SRational, Count::Any;
    /// Per-unit calibration for the first illuminant
    CameraCalibration1 = 50723 => SRational, Count::Any;
    /// Per-unit calibration for the second illuminant
    CameraCalibration2 = 50724 => SRational, Count::Any;
    /// Gain applied to each colour channel before the matrices
    AnalogBalance = 50727 => Rational, Count::Any;
    /// White balance at capture, in camera coordinates
    AsShotNeutral = 50728 => Rational, Count::Any;
    /// Exposure compensation in EV
    BaselineExposure = 50730 => SRational, Count::Fixed(1);
    /// Relative noise level
    BaselineNoise = 50731 => Rational, Count::Fixed(1);
    /// Relative sharpening amount
    BaselineSharpness = 50732 => Rational, Count::Fixed(1);
    /// Fraction of the encoding range with linear response
    LinearResponseLimit = 50734 => Rational, Count::Fixed(1);
    /// Camera serial number
    CameraSerialNumber = 50735 => Ascii, Count::Any;
    /// Illuminant of ColorMatrix1
    CalibrationIlluminant1 = 50778 => Short, Count::Fixed(1);
    /// Illuminant of ColorMatrix2
    CalibrationIlluminant2 = 50779 => Short, Count::Fixed(1);
    /// Sensor area containing valid image data (top, left, bottom, right)
    ActiveArea = 50829 => Long, Count::Fixed(4);
    /// Name of the colour profile
    ProfileName = 50936 => Ascii, Count::Any;
    /// White-balanced camera to XYZ D50 for the first illuminant
    ForwardMatrix1 = 50964 => SRational, Count::Any;
    /// White-balanced camera to XYZ D50 for the second illuminant
    ForwardMatrix2 = 50965 => SRational, Count::Any;
}

impl DngTag {
    /// Get the numeric tag ID.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Tags the encoder writes itself; callers may not supply them.
    pub const RESERVED: [DngTag; 8] = [
        DngTag::NewSubfileType,
        DngTag::Compression,
        DngTag::Software,
        DngTag::DngVersion,
        DngTag::DngBackwardVersion,
        DngTag::SampleFormat,
        DngTag::StripOffsets,
        DngTag::StripByteCounts,
    ];

    /// Whether the encoder injects this tag.
    pub fn is_reserved(self) -> bool {
        Self::RESERVED.contains(&self)
    }
}

/// Human-readable name for any tag id, falling back to the number.
pub fn tag_name(id: u16) -> String {
    match DngTag::from_u16(id) {
        Some(tag) => tag.name().to_string(),
        None => format!("Tag{}", id),
    }
}

// =============================================================================
// Enumerated Values
// =============================================================================

/// TIFF compression scheme identifiers.
///
/// Only uncompressed strips are ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Compression {
    /// No compression
    Uncompressed = 1,

    /// Lossless JPEG (never written here)
    Jpeg = 7,
}

/// Interpretation of sample values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum SampleFormat {
    /// Unsigned integer data
    Uint = 1,

    /// IEEE floating point data
    FloatingPoint = 3,
}

/// Photometric interpretation values used by raw images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum PhotometricInterpretation {
    BlackIsZero = 1,
    Rgb = 2,
    ColorFilterArray = 32803,
    LinearRaw = 34892,
}

/// Standard 2x2 Bayer layouts, as CFAPattern bytes (0 = R, 1 = G, 2 = B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CfaPattern {
    Rggb,
    Bggr,
    Grbg,
    Gbrg,
}

impl CfaPattern {
    /// Pattern bytes in row-major order.
    pub const fn bytes(self) -> [u8; 4] {
        match self {
            CfaPattern::Rggb => [0, 1, 1, 2],
            CfaPattern::Bggr => [2, 1, 1, 0],
            CfaPattern::Grbg => [1, 0, 2, 1],
            CfaPattern::Gbrg => [1, 2, 0, 1],
        }
    }
}

/// EXIF LightSource values used as calibration illuminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[repr(u16)]
pub enum CalibrationIlluminant {
    Unknown = 0,
    Daylight = 1,
    Fluorescent = 2,
    Tungsten = 3,
    Flash = 4,
    FineWeather = 9,
    CloudyWeather = 10,
    Shade = 11,
    DaylightFluorescent = 12,
    DayWhiteFluorescent = 13,
    CoolWhiteFluorescent = 14,
    WhiteFluorescent = 15,
    StandardLightA = 17,
    StandardLightB = 18,
    StandardLightC = 19,
    D55 = 20,
    D65 = 21,
    D75 = 22,
    D50 = 23,
    IsoStudioTungsten = 24,
    Other = 255,
}

/// DNG version numbers as the four bytes stored in DNGVersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DngVersion {
    V1_0,
    V1_1,
    V1_2,
    V1_3,
    V1_4,
    V1_5,
}

impl DngVersion {
    pub const fn bytes(self) -> [u8; 4] {
        match self {
            DngVersion::V1_0 => [1, 0, 0, 0],
            DngVersion::V1_1 => [1, 1, 0, 0],
            DngVersion::V1_2 => [1, 2, 0, 0],
            DngVersion::V1_3 => [1, 3, 0, 0],
            DngVersion::V1_4 => [1, 4, 0, 0],
            DngVersion::V1_5 => [1, 5, 0, 0],
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
