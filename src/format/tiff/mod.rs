//! TIFF/DNG container model, writer and reader.
//!
//! # Key Concepts
//!
//! - **Byte order**: the header declares its endianness (II = little-endian,
//!   MM = big-endian). Every multi-byte tag value and every native 16/32-bit
//!   sample is written in that order.
//!
//! - **IFD (Image File Directory)**: an entry count, 12-byte entries sorted by
//!   tag id, and a pointer to the next directory. A DNG written here has one
//!   directory holding the raw image.
//!
//! - **Inline vs offset values**: values of at most 4 bytes live in the entry
//!   itself; larger values are written after the directory and the entry holds
//!   their offset.
//!
//! - **Two passes**: [`Layout::plan`] sizes and places everything, then
//!   [`write_container`] emits bytes and checks them against the plan.

mod directory;
mod entries;
mod layout;
mod parser;
mod tags;
mod validation;
mod values;
mod writer;

pub use directory::{Container, Directory, ReservedTags};
pub use entries::{DngTags, TagEntry};
pub use layout::{DirectoryLayout, EntryLayout, EntryValue, Layout, Placement};
pub use parser::{
    is_tiff_header, parse_ifd, ByteOrder, Ifd, IfdEntry, TiffFile, TiffHeader, IFD_ENTRY_SIZE,
    TIFF_HEADER_SIZE,
};
pub use tags::{
    tag_name, CalibrationIlluminant, CfaPattern, Compression, Count, DngTag, DngVersion,
    FieldType, PhotometricInterpretation, SampleFormat, TagSpec,
};
pub use validation::{lint_tags, validate_tags, ImageGeometry, ValidationResult, REQUIRED_TAGS};
pub use values::{Rational, SRational, TagValue};
pub use writer::{container_to_bytes, stream_container, write_container};
