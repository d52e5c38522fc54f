//! Sample encoding for strip payloads.
//!
//! [`encode_u16`] turns integer samples into strip bytes for any supported
//! bit depth; [`encode_f32`] does the same for floating point frames.
//!
//! | bits | element | encoding                              |
//! |------|---------|---------------------------------------|
//! | 8    | u16     | low byte of each sample               |
//! | 10   | u16     | packed, 4 samples in 5 bytes          |
//! | 12   | u16     | packed, 2 samples in 3 bytes          |
//! | 14   | u16     | packed, 4 samples in 7 bytes          |
//! | 16   | u16     | native words in container byte order  |
//! | 32   | f32     | native words in container byte order  |

mod bitpack;
mod native;

use bytes::Bytes;
use tracing::debug;

use crate::convert::ElementType;
use crate::error::DngError;
use crate::format::tiff::ByteOrder;

pub use bitpack::{pack, packed_row_len, unpack, PackGroup, PACKED_BIT_DEPTHS};
pub use native::{f32_bytes, truncate_to_u8, u16_bytes};

/// Bit depths accepted for u16 frames.
pub const U16_BIT_DEPTHS: [u16; 5] = [8, 10, 12, 14, 16];

/// Bit depth required for f32 frames.
pub const F32_BIT_DEPTH: u16 = 32;

/// Encode integer samples, `row_len` per row, at `bit_depth`.
///
/// # Errors
/// - `UnsupportedBitDepth` for depths outside [`U16_BIT_DEPTHS`]
/// - `InvalidFrame` if a packed depth gets a partial row
pub fn encode_u16(
    samples: &[u16],
    row_len: usize,
    bit_depth: u16,
    order: ByteOrder,
) -> Result<Bytes, DngError> {
    let encoded = match bit_depth {
        8 => truncate_to_u8(samples),
        10 | 12 | 14 => pack(samples, row_len, bit_depth)?,
        16 => u16_bytes(samples, order),
        bits => {
            return Err(DngError::UnsupportedBitDepth {
                bits,
                element: ElementType::U16,
            })
        }
    };

    debug!(
        samples = samples.len(),
        bit_depth,
        bytes = encoded.len(),
        "encoded integer samples"
    );
    Ok(Bytes::from(encoded))
}

/// Encode floating point samples. Only 32 bits per sample is supported.
pub fn encode_f32(samples: &[f32], bit_depth: u16, order: ByteOrder) -> Result<Bytes, DngError> {
    if bit_depth != F32_BIT_DEPTH {
        return Err(DngError::UnsupportedBitDepth {
            bits: bit_depth,
            element: ElementType::F32,
        });
    }

    let encoded = f32_bytes(samples, order);
    debug!(samples = samples.len(), bytes = encoded.len(), "encoded float samples");
    Ok(Bytes::from(encoded))
}

// =============================================================================
// Tests
// =============================================================================
