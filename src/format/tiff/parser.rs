//! TIFF header and directory parsing.
//!
//! The writer never needs to read, but produced files are checked by
//! walking them back through this parser: the `inspect` command prints
//! them, and the test suite asserts on their structure.
//!
//! # TIFF Header Structure
//!
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! # IFD Structure
//!
//! ```text
//! 2 bytes:       entry count N
//! N * 12 bytes:  entries (tag u16, type u16, count u32, value-or-offset u32)
//! 4 bytes:       offset of the next IFD (0 = last)
//! ```

use std::collections::HashSet;

use serde::Serialize;

use crate::error::TiffError;
use crate::io::{
    put_u16_be, put_u16_le, put_u32_be, put_u32_le, read_u16_be, read_u16_le, read_u32_be,
    read_u32_le,
};

use super::tags::{DngTag, FieldType};
use super::values::TagValue;

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
pub const VERSION_TIFF: u16 = 42;

/// Size of classic TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of one IFD entry in bytes
pub const IFD_ENTRY_SIZE: usize = 12;

/// Size of the entry count field at the start of an IFD
pub const IFD_COUNT_SIZE: usize = 2;

/// Size of the next IFD offset field at the end of an IFD
pub const IFD_NEXT_OFFSET_SIZE: usize = 4;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    #[default]
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// The two marker bytes that open the header.
    pub const fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => *b"II",
            ByteOrder::BigEndian => *b"MM",
        }
    }

    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    /// Append a u16 using this byte order.
    #[inline]
    pub fn put_u16(self, out: &mut Vec<u8>, value: u16) {
        match self {
            ByteOrder::LittleEndian => put_u16_le(out, value),
            ByteOrder::BigEndian => put_u16_be(out, value),
        }
    }

    /// Append a u32 using this byte order.
    #[inline]
    pub fn put_u32(self, out: &mut Vec<u8>, value: u32) {
        match self {
            ByteOrder::LittleEndian => put_u32_le(out, value),
            ByteOrder::BigEndian => put_u32_be(out, value),
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Classic TIFF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Offset to the first IFD in the file
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Parse a TIFF header from raw bytes.
    ///
    /// # Errors
    /// - `FileTooSmall` if there aren't 8 bytes
    /// - `InvalidMagic` if byte order bytes are not II or MM
    /// - `InvalidVersion` if version is not 42 (BigTIFF is never written)
    /// - `InvalidIfdOffset` if the first IFD offset is outside the file
    pub fn parse(bytes: &[u8]) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        // Read as little-endian because we're matching fixed byte patterns
        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);
        if version != VERSION_TIFF {
            return Err(TiffError::InvalidVersion(version));
        }

        let first_ifd_offset = byte_order.read_u32(&bytes[4..8]);
        if first_ifd_offset as usize >= bytes.len() {
            return Err(TiffError::InvalidIfdOffset(first_ifd_offset as u64));
        }

        Ok(TiffHeader {
            byte_order,
            first_ifd_offset,
        })
    }

    /// Encode the 8 header bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TIFF_HEADER_SIZE);
        out.extend_from_slice(&self.byte_order.marker());
        self.byte_order.put_u16(&mut out, VERSION_TIFF);
        self.byte_order.put_u32(&mut out, self.first_ifd_offset);
        out
    }
}

/// Quick check whether `bytes` start with a classic TIFF header.
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    if bytes.len() < TIFF_HEADER_SIZE {
        return false;
    }

    let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
    let byte_order = match magic {
        BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
        BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
        _ => return false,
    };
    byte_order.read_u16(&bytes[2..4]) == VERSION_TIFF
}

// =============================================================================
// IFD
// =============================================================================

/// A parsed IFD entry with its value resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfdEntry {
    /// Tag identifier
    pub tag: u16,

    /// Declared element count
    pub count: u32,

    /// Whether the value sat inside the entry itself
    pub is_inline: bool,

    /// Offset of the value when stored out of line
    pub value_offset: Option<u32>,

    /// Decoded value
    pub value: TagValue,
}

/// A parsed Image File Directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ifd {
    /// Absolute offset of the directory
    pub offset: u32,

    /// Entries in file order
    pub entries: Vec<IfdEntry>,

    /// Offset of the next directory, 0 for the last one
    pub next_ifd_offset: u32,
}

impl Ifd {
    /// Find an entry by numeric tag id.
    pub fn get(&self, tag: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Find an entry by catalog tag.
    pub fn get_entry_by_tag(&self, tag: DngTag) -> Option<&IfdEntry> {
        self.get(tag.as_u16())
    }

    /// Read a single SHORT or LONG value by catalog tag.
    pub fn get_u32(&self, tag: DngTag) -> Option<u32> {
        self.get_entry_by_tag(tag).and_then(|e| e.value.first_u32())
    }

    /// Read a SHORT or LONG array by catalog tag.
    pub fn get_u32s(&self, tag: DngTag) -> Option<Vec<u32>> {
        self.get_entry_by_tag(tag).and_then(|e| e.value.as_u32s())
    }

    /// Whether entry tags are strictly ascending, as TIFF requires.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].tag < w[1].tag)
    }

    /// Slices of each strip's payload, from StripOffsets and StripByteCounts.
    pub fn strips<'a>(&self, file: &'a [u8]) -> Result<Vec<&'a [u8]>, TiffError> {
        let offsets = self.get_u32s(DngTag::StripOffsets).unwrap_or_default();
        let counts = self.get_u32s(DngTag::StripByteCounts).unwrap_or_default();

        offsets
            .iter()
            .zip(counts.iter())
            .map(|(&offset, &len)| {
                let start = offset as usize;
                let end = start + len as usize;
                file.get(start..end).ok_or(TiffError::ValueOutOfBounds {
                    tag: DngTag::StripOffsets.as_u16(),
                    offset: offset as u64,
                    len: len as u64,
                    size: file.len() as u64,
                })
            })
            .collect()
    }
}

/// A fully parsed container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiffFile {
    pub header: TiffHeader,
    pub ifds: Vec<Ifd>,
}

impl TiffFile {
    /// Parse the header and walk the whole IFD chain.
    pub fn parse(bytes: &[u8]) -> Result<Self, TiffError> {
        let header = TiffHeader::parse(bytes)?;
        let mut ifds = Vec::new();
        let mut seen = HashSet::new();
        let mut offset = header.first_ifd_offset;

        while offset != 0 {
            if !seen.insert(offset) {
                return Err(TiffError::IfdLoop(offset as u64));
            }
            let ifd = parse_ifd(bytes, offset, header.byte_order)?;
            offset = ifd.next_ifd_offset;
            ifds.push(ifd);
        }

        Ok(TiffFile { header, ifds })
    }
}

/// Parse a single IFD at `offset`.
pub fn parse_ifd(bytes: &[u8], offset: u32, order: ByteOrder) -> Result<Ifd, TiffError> {
    let start = offset as usize;
    let too_small = |required: usize| TiffError::FileTooSmall {
        required: required as u64,
        actual: bytes.len() as u64,
    };

    if start + IFD_COUNT_SIZE > bytes.len() {
        return Err(too_small(start + IFD_COUNT_SIZE));
    }
    let entry_count = order.read_u16(&bytes[start..]) as usize;

    let entries_start = start + IFD_COUNT_SIZE;
    let next_pos = entries_start + entry_count * IFD_ENTRY_SIZE;
    if next_pos + IFD_NEXT_OFFSET_SIZE > bytes.len() {
        return Err(too_small(next_pos + IFD_NEXT_OFFSET_SIZE));
    }

    let mut entries = Vec::with_capacity(entry_count);
    for i in 0..entry_count {
        let raw = &bytes[entries_start + i * IFD_ENTRY_SIZE..][..IFD_ENTRY_SIZE];
        entries.push(parse_entry(bytes, raw, order)?);
    }

    let next_ifd_offset = order.read_u32(&bytes[next_pos..]);
    if next_ifd_offset != 0 && next_ifd_offset as usize >= bytes.len() {
        return Err(TiffError::InvalidIfdOffset(next_ifd_offset as u64));
    }

    Ok(Ifd {
        offset,
        entries,
        next_ifd_offset,
    })
}

fn parse_entry(file: &[u8], raw: &[u8], order: ByteOrder) -> Result<IfdEntry, TiffError> {
    let tag = order.read_u16(&raw[0..2]);
    let type_code = order.read_u16(&raw[2..4]);
    let count = order.read_u32(&raw[4..8]);
    let field_type = FieldType::from_u16(type_code).ok_or(TiffError::UnknownFieldType(type_code))?;

    let len = field_type.size_in_bytes() as u64 * count as u64;
    let is_inline = field_type.fits_inline(count as u64);

    let (value_bytes, value_offset) = if is_inline {
        (&raw[8..12], None)
    } else {
        let offset = order.read_u32(&raw[8..12]);
        let end = offset as u64 + len;
        if end > file.len() as u64 {
            return Err(TiffError::ValueOutOfBounds {
                tag,
                offset: offset as u64,
                len,
                size: file.len() as u64,
            });
        }
        (&file[offset as usize..end as usize], Some(offset))
    };

    Ok(IfdEntry {
        tag,
        count,
        is_inline,
        value_offset,
        value: TagValue::decode(field_type, count as usize, value_bytes, order),
    })
}

// =============================================================================
// Tests
// =============================================================================
