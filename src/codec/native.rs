//! Unpacked sample paths: 8-bit truncation and native 16/32-bit bytes.

use crate::format::tiff::ByteOrder;

/// Keep the low 8 bits of each sample.
pub fn truncate_to_u8(samples: &[u16]) -> Vec<u8> {
    samples.iter().map(|&s| (s & 0xFF) as u8).collect()
}

/// Samples as 16-bit words in `order`.
pub fn u16_bytes(samples: &[u16], order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    match order {
        ByteOrder::LittleEndian => samples
            .iter()
            .for_each(|s| out.extend_from_slice(&s.to_le_bytes())),
        ByteOrder::BigEndian => samples
            .iter()
            .for_each(|s| out.extend_from_slice(&s.to_be_bytes())),
    }
    out
}

/// Samples as IEEE single precision words in `order`.
pub fn f32_bytes(samples: &[f32], order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 4);
    match order {
        ByteOrder::LittleEndian => samples
            .iter()
            .for_each(|s| out.extend_from_slice(&s.to_le_bytes())),
        ByteOrder::BigEndian => samples
            .iter()
            .for_each(|s| out.extend_from_slice(&s.to_be_bytes())),
    }
    out
}
