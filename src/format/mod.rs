//! Container formats.
//!
//! Only classic TIFF-based DNG is supported: [`tiff`] holds the tag catalog,
//! the two-pass writer and a small reader used for inspection.

pub mod tiff;

pub use tiff::{is_tiff_header, ByteOrder, Container, DngTag, DngTags, TagValue};
