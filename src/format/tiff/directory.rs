//! Container model: directories, strips and encoder-injected tags.

use std::collections::HashSet;

use bytes::Bytes;

use crate::error::DngError;

use super::entries::{DngTags, TagEntry};
use super::parser::ByteOrder;
use super::tags::{Compression, DngTag, DngVersion, SampleFormat};
use super::values::TagValue;

/// One image directory and the strips it points at.
///
/// StripOffsets and StripByteCounts are not part of `entries`; the layout
/// engine derives them from `strips`.
#[derive(Debug, Clone)]
pub struct Directory {
    entries: Vec<TagEntry>,
    strips: Vec<Bytes>,
}

impl Directory {
    /// Build a directory from explicit entries.
    ///
    /// # Errors
    /// - `ReservedTagConflict` if an entry is StripOffsets or StripByteCounts
    /// - `DuplicateTag` if two entries share a tag id
    pub fn new(mut entries: Vec<TagEntry>, strips: Vec<Bytes>) -> Result<Self, DngError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.tag == DngTag::StripOffsets.as_u16()
                || entry.tag == DngTag::StripByteCounts.as_u16()
            {
                let tag = DngTag::from_u16(entry.tag).map_or("StripOffsets", DngTag::name);
                return Err(DngError::ReservedTagConflict { tag, id: entry.tag });
            }
            if !seen.insert(entry.tag) {
                return Err(DngError::DuplicateTag(entry.tag));
            }
        }

        entries.sort_by_key(|e| e.tag);
        Ok(Self { entries, strips })
    }

    /// Build the main DNG directory from caller metadata plus injected tags.
    ///
    /// Caller tags are checked for reserved collisions before anything is
    /// merged.
    pub fn compose(
        caller: &DngTags,
        reserved: &ReservedTags,
        strips: Vec<Bytes>,
    ) -> Result<Self, DngError> {
        caller.check_reserved()?;

        let mut entries = reserved.entries()?;
        entries.extend(caller.to_entries());
        Self::new(entries, strips)
    }

    /// Entries sorted by ascending tag id.
    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    pub fn strips(&self) -> &[Bytes] {
        &self.strips
    }

    /// StripByteCounts value for these strips.
    pub fn strip_byte_counts(&self) -> Result<Vec<u32>, DngError> {
        self.strips
            .iter()
            .map(|s| {
                u32::try_from(s.len()).map_err(|_| DngError::ContainerTooLarge {
                    size: s.len() as u64,
                })
            })
            .collect()
    }
}

/// A complete container: header byte order plus chained directories.
#[derive(Debug, Clone)]
pub struct Container {
    pub byte_order: ByteOrder,
    pub directories: Vec<Directory>,
}

impl Container {
    pub fn new(byte_order: ByteOrder, directories: Vec<Directory>) -> Self {
        Self {
            byte_order,
            directories,
        }
    }

    /// Container with a single directory.
    pub fn single(byte_order: ByteOrder, directory: Directory) -> Self {
        Self::new(byte_order, vec![directory])
    }
}

// =============================================================================
// Reserved Tags
// =============================================================================

/// Values of the tags the encoder injects into the main directory.
///
/// StripOffsets and StripByteCounts are not listed; they come from the
/// strips themselves during layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservedTags {
    pub new_subfile_type: u32,
    pub compression: Compression,
    pub software: String,
    pub dng_version: DngVersion,
    pub backward_version: DngVersion,
    pub sample_format: SampleFormat,
    /// Number of SampleFormat values to write, one per sample plane
    pub samples_per_pixel: u16,
}

impl ReservedTags {
    /// Reserved tags for a main raw image with the given sample format.
    ///
    /// Floating point data requires DNG 1.4 readers; integer data stays
    /// readable by 1.0 readers.
    pub fn for_main_image(sample_format: SampleFormat, software: impl Into<String>) -> Self {
        let backward_version = match sample_format {
            SampleFormat::Uint => DngVersion::V1_0,
            SampleFormat::FloatingPoint => DngVersion::V1_4,
        };
        Self {
            new_subfile_type: 0,
            compression: Compression::Uncompressed,
            software: software.into(),
            dng_version: DngVersion::V1_4,
            backward_version,
            sample_format,
            samples_per_pixel: 1,
        }
    }

    pub fn with_samples_per_pixel(mut self, samples_per_pixel: u16) -> Self {
        self.samples_per_pixel = samples_per_pixel.max(1);
        self
    }

    /// Directory entries for these values.
    pub fn entries(&self) -> Result<Vec<TagEntry>, DngError> {
        Ok(vec![
            TagEntry::new(
                DngTag::NewSubfileType,
                TagValue::Long(vec![self.new_subfile_type]),
            )?,
            TagEntry::new(
                DngTag::Compression,
                TagValue::Short(vec![self.compression as u16]),
            )?,
            TagEntry::new(DngTag::Software, TagValue::Ascii(self.software.clone()))?,
            TagEntry::new(
                DngTag::SampleFormat,
                TagValue::Short(vec![self.sample_format as u16; self.samples_per_pixel as usize]),
            )?,
            TagEntry::new(
                DngTag::DngVersion,
                TagValue::Byte(self.dng_version.bytes().to_vec()),
            )?,
            TagEntry::new(
                DngTag::DngBackwardVersion,
                TagValue::Byte(self.backward_version.bytes().to_vec()),
            )?,
        ])
    }
}

// =============================================================================
// Tests
// =============================================================================
