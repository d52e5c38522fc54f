//! Sizing pass of the container writer.
//!
//! [`Layout::plan`] walks every directory, entry and strip once and assigns
//! each an absolute offset before a single byte is emitted:
//!
//! ```text
//! ┌──────────┬─────────────────────────────────┬─────────────────┐
//! │ header   │ directory 0 │ blobs 0 │ dir 1 … │ strips          │
//! │ 8 bytes  │ 2+12n+4     │ even    │         │ even-aligned    │
//! └──────────┴─────────────────────────────────┴─────────────────┘
//! ```
//!
//! Values larger than 4 bytes become out-of-line blobs placed right after
//! their directory in tag order, each padded to an even length. The
//! StripOffsets value cannot be final until strips are actually placed, so
//! the plan records it as a reserved slot with planned contents; the
//! emission pass resolves it.

use tracing::debug;

use crate::error::DngError;

use super::directory::Container;
use super::parser::{
    ByteOrder, IFD_COUNT_SIZE, IFD_ENTRY_SIZE, IFD_NEXT_OFFSET_SIZE, TIFF_HEADER_SIZE,
};
use super::tags::{DngTag, FieldType};
use super::values::TagValue;

// =============================================================================
// Plan Types
// =============================================================================

/// Where an entry's value lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Inside the 4-byte value field of the entry
    Inline,

    /// In a blob at this absolute offset
    OutOfLine { offset: u32 },
}

/// Content of an entry's value.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    /// Known before layout
    Fixed(TagValue),

    /// StripOffsets: size known, contents resolved after strip placement
    Reserved { planned: Vec<u32> },
}

impl EntryValue {
    /// Value as planned; for reserved slots, the planned offsets.
    pub fn planned(&self) -> TagValue {
        match self {
            EntryValue::Fixed(value) => value.clone(),
            EntryValue::Reserved { planned } => TagValue::Long(planned.clone()),
        }
    }
}

/// One directory entry with its placement resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryLayout {
    pub tag: u16,
    pub field_type: FieldType,
    pub count: u32,
    pub byte_len: u32,
    pub value: EntryValue,
    pub placement: Placement,
}

/// Placement of one directory, its blobs and its strips.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryLayout {
    /// Absolute offset of the entry count field
    pub offset: u32,

    /// Entries in ascending tag order
    pub entries: Vec<EntryLayout>,

    /// Offset written in the next-IFD field (0 for the last directory)
    pub next_offset: u32,

    /// Planned absolute offset of each strip
    pub strip_offsets: Vec<u32>,
}

impl DirectoryLayout {
    /// Size of the directory block itself, excluding blobs.
    pub fn block_size(&self) -> usize {
        directory_block_size(self.entries.len())
    }
}

/// Result of the sizing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub byte_order: ByteOrder,
    pub directories: Vec<DirectoryLayout>,

    /// Exact number of bytes the emission pass must produce
    pub total_len: u64,
}

#[inline]
fn directory_block_size(entry_count: usize) -> usize {
    IFD_COUNT_SIZE + entry_count * IFD_ENTRY_SIZE + IFD_NEXT_OFFSET_SIZE
}

#[inline]
fn align_even(pos: u64) -> u64 {
    pos + (pos & 1)
}

// =============================================================================
// Sizing Pass
// =============================================================================

impl Layout {
    /// Compute the placement of every byte of `container`.
    ///
    /// # Errors
    /// - `ContainerTooLarge` if any offset would not fit in 32 bits
    /// - `InvalidTagValue` if a value's count does not fit the count field
    pub fn plan(container: &Container) -> Result<Self, DngError> {
        let limit = u32::MAX as u64;
        let too_large = |size: u64| DngError::ContainerTooLarge { size };
        let to_u32 = |pos: u64| u32::try_from(pos).map_err(|_| too_large(pos));

        let mut pos = TIFF_HEADER_SIZE as u64;
        let mut directories = Vec::with_capacity(container.directories.len());

        // Directories and blobs
        for directory in &container.directories {
            let byte_counts = directory.strip_byte_counts()?;
            let strip_count = directory.strips().len();

            let mut values: Vec<(u16, EntryValue)> = directory
                .entries()
                .iter()
                .map(|e| (e.tag, EntryValue::Fixed(e.value.clone())))
                .collect();
            values.push((
                DngTag::StripOffsets.as_u16(),
                EntryValue::Reserved {
                    planned: vec![0; strip_count],
                },
            ));
            values.push((
                DngTag::StripByteCounts.as_u16(),
                EntryValue::Fixed(TagValue::Long(byte_counts)),
            ));
            values.sort_by_key(|(tag, _)| *tag);

            let offset = to_u32(pos)?;
            pos += directory_block_size(values.len()) as u64;

            let mut entries = Vec::with_capacity(values.len());
            for (tag, value) in values {
                let planned = value.planned();
                let field_type = planned.field_type();
                let count =
                    u32::try_from(planned.count()).map_err(|_| DngError::InvalidTagValue {
                        tag: DngTag::from_u16(tag).map_or("custom", DngTag::name),
                        message: format!("{} elements exceed the count field", planned.count()),
                    })?;
                let byte_len = planned.byte_len() as u64;

                let placement = if planned.is_inline() {
                    Placement::Inline
                } else {
                    let blob_offset = to_u32(pos)?;
                    pos = align_even(pos + byte_len);
                    Placement::OutOfLine {
                        offset: blob_offset,
                    }
                };

                entries.push(EntryLayout {
                    tag,
                    field_type,
                    count,
                    byte_len: to_u32(byte_len)?,
                    value,
                    placement,
                });
            }

            directories.push(DirectoryLayout {
                offset,
                entries,
                next_offset: 0,
                strip_offsets: Vec::with_capacity(strip_count),
            });
        }

        // Chain directories
        for i in 1..directories.len() {
            directories[i - 1].next_offset = directories[i].offset;
        }

        // Strips, in directory order
        for (layout, directory) in directories.iter_mut().zip(&container.directories) {
            for strip in directory.strips() {
                pos = align_even(pos);
                layout.strip_offsets.push(to_u32(pos)?);
                pos += strip.len() as u64;
            }

            let planned = layout.strip_offsets.clone();
            for entry in &mut layout.entries {
                if let EntryValue::Reserved { planned: slot } = &mut entry.value {
                    *slot = planned.clone();
                }
            }
        }

        if pos > limit {
            return Err(too_large(pos));
        }

        debug!(
            directories = directories.len(),
            total_len = pos,
            "planned container layout"
        );

        Ok(Layout {
            byte_order: container.byte_order,
            directories,
            total_len: pos,
        })
    }

    /// Offset of the first directory, as written in the header.
    pub fn first_ifd_offset(&self) -> u32 {
        self.directories.first().map_or(0, |d| d.offset)
    }
}

// =============================================================================
// Tests
// =============================================================================
