//! # raw2dng
//!
//! Writes raw camera sensor frames as DNG (Adobe Digital Negative) files
//! without any external codec.
//!
//! ## Features
//!
//! - **Bit packing**: 10, 12 and 14-bit samples are packed MSB-first; 8, 16
//!   and 32-bit float samples are written natively
//! - **Two-pass layout**: every offset is planned before a byte is written,
//!   and the emitted size is checked against the plan
//! - **Buffered or streamed output**: both produce identical bytes
//! - **Camera profiles**: colour and CFA metadata from JSON
//!
//! ## Architecture
//!
//! - [`codec`] - Sample encoding and bit packing
//! - [`mod@format`] - TIFF/DNG tag catalog, container writer and reader
//! - [`io`] - Output sinks and endian helpers
//! - [`convert`] - Frame validation and the configured converter
//! - [`config`] - CLI configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use raw2dng::{DngConverter, DngTag, DngTags, SampleBuffer};
//!
//! fn main() -> Result<(), raw2dng::DngError> {
//!     let mut tags = DngTags::new();
//!     tags.set_u32(DngTag::ImageWidth, 4000)?;
//!     tags.set_u32(DngTag::ImageLength, 3000)?;
//!     tags.set_u32(DngTag::BitsPerSample, 14)?;
//!     tags.set_u32(DngTag::WhiteLevel, 16383)?;
//!
//!     let converter = DngConverter::new(tags, "/tmp")?;
//!     let frame = SampleBuffer::from_u16(3000, 4000, vec![16383; 4000 * 3000])?;
//!     let path = converter.to_file(&frame, "capture")?;
//!     println!("wrote {}", path.display());
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod io;

// Re-export commonly used types
pub use config::{Cli, Command, ConvertConfig, InspectConfig};
pub use convert::{
    CameraModel, CameraProfile, ConvertOutput, Destination, DngConverter, ElementType,
    PixelFilter, SampleBuffer, SampleData,
};
pub use error::{DngError, TiffError};
pub use format::tiff::{
    container_to_bytes, stream_container, write_container, ByteOrder, CalibrationIlluminant,
    CfaPattern, Container, Directory, DngTag, DngTags, Layout, PhotometricInterpretation,
    ReservedTags, SampleFormat, TagEntry, TagValue, TiffFile,
};
pub use io::{BufferSink, DngSink, StreamSink};
