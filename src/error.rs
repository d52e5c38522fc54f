use thiserror::Error;

use crate::convert::ElementType;

/// Errors raised while configuring a converter or writing a DNG container.
#[derive(Debug, Error)]
pub enum DngError {
    /// Configured metadata lacks a tag every conversion depends on
    #[error("Missing required tag: {0}")]
    MissingRequiredTag(&'static str),

    /// Caller metadata collides with a tag the writer injects itself
    #[error("Tag {tag} ({id}) is written by the encoder and cannot be set by the caller")]
    ReservedTagConflict { tag: &'static str, id: u16 },

    /// Directory would contain the same tag twice
    #[error("Duplicate tag {0} in directory")]
    DuplicateTag(u16),

    /// Tag value does not match the catalog's declared kind or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Frame element type cannot be written as DNG samples
    #[error("Unsupported frame element type {0}: expected u16 or f32")]
    InvalidInputFormat(ElementType),

    /// Sample count disagrees with the declared frame shape
    #[error("Invalid frame: shape {shape:?} needs {expected} samples, got {actual}")]
    InvalidFrame {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// Frame dimensions disagree with the configured width/height
    #[error("Frame shape mismatch: expected (height, width) = {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: Vec<usize>,
    },

    /// Pixel filter broke its input/output contract
    #[error("Pixel filter contract violated: {0}")]
    FilterContractViolation(String),

    /// Bits per sample not supported for the frame's element type
    #[error("Unsupported bit depth {bits} for {element} samples")]
    UnsupportedBitDepth { bits: u16, element: ElementType },

    /// Sizing and emission passes disagree; always an encoder defect
    #[error("Layout mismatch at {stage}: planned {predicted}, produced {actual}")]
    LayoutSizeMismatch {
        stage: &'static str,
        predicted: u64,
        actual: u64,
    },

    /// Container would need offsets beyond classic TIFF's 32-bit range
    #[error("Container too large: {size} bytes exceeds the 4 GiB classic TIFF limit")]
    ContainerTooLarge { size: u64 },

    /// Camera profile could not be read or does not describe a sensor
    #[error("Invalid camera profile: {0}")]
    InvalidProfile(String),

    /// Underlying write or rename failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when reading back a TIFF/DNG container.
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42, got {0}")]
    InvalidVersion(u16),

    /// File is too small to contain the structure being read
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Out-of-line value points outside the file
    #[error("Value for tag {tag} at offset {offset} ({len} bytes) exceeds file size {size}")]
    ValueOutOfBounds {
        tag: u16,
        offset: u64,
        len: u64,
        size: u64,
    },

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),

    /// IFD chain revisits a directory
    #[error("IFD chain loops back to offset {0}")]
    IfdLoop(u64),
}
