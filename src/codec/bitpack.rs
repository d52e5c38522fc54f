//! MSB-first sub-byte packing for 10, 12 and 14-bit samples.
//!
//! Each bit depth packs a fixed group of samples into a whole number of
//! bytes:
//!
//! | bits | samples per group | bytes per group |
//! |------|-------------------|-----------------|
//! | 10   | 4                 | 5               |
//! | 12   | 2                 | 3               |
//! | 14   | 4                 | 7               |
//!
//! Rows whose width is not a multiple of the group are padded with zero
//! samples, packed, and then truncated to `ceil(width * bits / 8)` bytes.
//! The padding only ever spills into whole trailing bytes, so truncation
//! never touches real sample bits.

use crate::convert::ElementType;
use crate::error::DngError;

/// Bit depths handled by the packer.
pub const PACKED_BIT_DEPTHS: [u16; 3] = [10, 12, 14];

/// Group shape for a packed bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackGroup {
    /// Samples per group
    pub samples: usize,

    /// Bytes per group
    pub bytes: usize,
}

impl PackGroup {
    /// Group shape for `bit_depth`, or `None` if it is not a packed depth.
    pub const fn for_depth(bit_depth: u16) -> Option<Self> {
        match bit_depth {
            10 => Some(Self {
                samples: 4,
                bytes: 5,
            }),
            12 => Some(Self {
                samples: 2,
                bytes: 3,
            }),
            14 => Some(Self {
                samples: 4,
                bytes: 7,
            }),
            _ => None,
        }
    }
}

/// Packed length of one row: `ceil(width * bits / 8)`.
#[inline]
pub fn packed_row_len(width: usize, bit_depth: u16) -> usize {
    (width * bit_depth as usize).div_ceil(8)
}

fn unsupported(bit_depth: u16) -> DngError {
    DngError::UnsupportedBitDepth {
        bits: bit_depth,
        element: ElementType::U16,
    }
}

fn ragged(samples: usize, row_len: usize) -> DngError {
    DngError::InvalidFrame {
        shape: vec![samples / row_len.max(1), row_len],
        expected: (samples / row_len.max(1) + 1) * row_len,
        actual: samples,
    }
}

// =============================================================================
// Group Transforms
// =============================================================================

#[inline]
fn pack10(s: &[u16; 4], out: &mut Vec<u8>) {
    out.extend_from_slice(&[
        (s[0] >> 2) as u8,
        (((s[0] & 0x3) << 6) | (s[1] >> 4)) as u8,
        (((s[1] & 0xF) << 4) | (s[2] >> 6)) as u8,
        (((s[2] & 0x3F) << 2) | (s[3] >> 8)) as u8,
        (s[3] & 0xFF) as u8,
    ]);
}

#[inline]
fn pack12(s: &[u16; 4], out: &mut Vec<u8>) {
    out.extend_from_slice(&[
        (s[0] >> 4) as u8,
        (((s[0] & 0xF) << 4) | (s[1] >> 8)) as u8,
        (s[1] & 0xFF) as u8,
    ]);
}

#[inline]
fn pack14(s: &[u16; 4], out: &mut Vec<u8>) {
    out.extend_from_slice(&[
        (s[0] >> 6) as u8,
        (((s[0] & 0x3F) << 2) | (s[1] >> 12)) as u8,
        ((s[1] >> 4) & 0xFF) as u8,
        (((s[1] & 0xF) << 4) | (s[2] >> 10)) as u8,
        ((s[2] >> 2) & 0xFF) as u8,
        (((s[2] & 0x3) << 6) | (s[3] >> 8)) as u8,
        (s[3] & 0xFF) as u8,
    ]);
}

#[inline]
fn unpack10(b: &[u8], out: &mut [u16; 4]) {
    let b: [u16; 5] = [b[0].into(), b[1].into(), b[2].into(), b[3].into(), b[4].into()];
    out[0] = (b[0] << 2) | (b[1] >> 6);
    out[1] = ((b[1] & 0x3F) << 4) | (b[2] >> 4);
    out[2] = ((b[2] & 0xF) << 6) | (b[3] >> 2);
    out[3] = ((b[3] & 0x3) << 8) | b[4];
}

#[inline]
fn unpack12(b: &[u8], out: &mut [u16; 4]) {
    let b: [u16; 3] = [b[0].into(), b[1].into(), b[2].into()];
    out[0] = (b[0] << 4) | (b[1] >> 4);
    out[1] = ((b[1] & 0xF) << 8) | b[2];
}

#[inline]
fn unpack14(b: &[u8], out: &mut [u16; 4]) {
    let b: [u16; 7] = [
        b[0].into(),
        b[1].into(),
        b[2].into(),
        b[3].into(),
        b[4].into(),
        b[5].into(),
        b[6].into(),
    ];
    out[0] = (b[0] << 6) | (b[1] >> 2);
    out[1] = ((b[1] & 0x3) << 12) | (b[2] << 4) | (b[3] >> 4);
    out[2] = ((b[3] & 0xF) << 10) | (b[4] << 2) | (b[5] >> 6);
    out[3] = ((b[5] & 0x3F) << 8) | b[6];
}

// =============================================================================
// Pack / Unpack
// =============================================================================

/// Pack row-major `samples` with `row_len` samples per row.
///
/// Samples are masked to `bit_depth` bits first, so an out-of-range value
/// can never bleed into its neighbours.
///
/// # Errors
/// - `UnsupportedBitDepth` unless `bit_depth` is 10, 12 or 14
/// - `InvalidFrame` if `samples` is not a whole number of rows
pub fn pack(samples: &[u16], row_len: usize, bit_depth: u16) -> Result<Vec<u8>, DngError> {
    let group = PackGroup::for_depth(bit_depth).ok_or_else(|| unsupported(bit_depth))?;
    let pack_group: fn(&[u16; 4], &mut Vec<u8>) = match bit_depth {
        10 => pack10,
        12 => pack12,
        _ => pack14,
    };

    if row_len == 0 {
        return if samples.is_empty() {
            Ok(Vec::new())
        } else {
            Err(ragged(samples.len(), row_len))
        };
    }
    if samples.len() % row_len != 0 {
        return Err(ragged(samples.len(), row_len));
    }

    let mask = (1u16 << bit_depth) - 1;
    let row_bytes = packed_row_len(row_len, bit_depth);
    let rows = samples.len() / row_len;
    let mut out = Vec::with_capacity(rows * row_len.div_ceil(group.samples) * group.bytes);

    for row in samples.chunks_exact(row_len) {
        let row_start = out.len();
        for chunk in row.chunks(group.samples) {
            // Short trailing chunk stays zero-padded
            let mut buf = [0u16; 4];
            for (slot, &sample) in buf.iter_mut().zip(chunk) {
                *slot = sample & mask;
            }
            pack_group(&buf, &mut out);
        }
        out.truncate(row_start + row_bytes);
    }

    Ok(out)
}

/// Inverse of [`pack`]: recover `rows * row_len` samples.
///
/// # Errors
/// - `UnsupportedBitDepth` unless `bit_depth` is 10, 12 or 14
/// - `InvalidFrame` if `packed` is not exactly `rows` packed rows
pub fn unpack(
    packed: &[u8],
    row_len: usize,
    rows: usize,
    bit_depth: u16,
) -> Result<Vec<u16>, DngError> {
    let group = PackGroup::for_depth(bit_depth).ok_or_else(|| unsupported(bit_depth))?;
    let unpack_group: fn(&[u8], &mut [u16; 4]) = match bit_depth {
        10 => unpack10,
        12 => unpack12,
        _ => unpack14,
    };

    let row_bytes = packed_row_len(row_len, bit_depth);
    if packed.len() != rows * row_bytes {
        return Err(DngError::InvalidFrame {
            shape: vec![rows, row_len],
            expected: rows * row_bytes,
            actual: packed.len(),
        });
    }

    let mut out = Vec::with_capacity(rows * row_len);
    let padded_len = row_len.div_ceil(group.samples) * group.bytes;
    let mut padded = vec![0u8; padded_len];

    for row in packed.chunks_exact(row_bytes.max(1)).take(rows) {
        padded[..row_bytes].copy_from_slice(row);
        padded[row_bytes..].fill(0);

        let mut remaining = row_len;
        for chunk in padded.chunks_exact(group.bytes) {
            let mut buf = [0u16; 4];
            unpack_group(chunk, &mut buf);
            let take = remaining.min(group.samples);
            out.extend_from_slice(&buf[..take]);
            remaining -= take;
        }
    }

    Ok(out)
}

// =============================================================================
// Tests
// =============================================================================
