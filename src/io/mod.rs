//! Byte-level I/O for container emission and inspection.
//!
//! - [`DngSink`] abstracts the destination the layout engine writes into:
//!   a growable in-memory buffer or a forward-only stream.
//! - The endian helpers encode and decode multi-byte TIFF values.

mod endian;
mod sink;

pub use endian::{
    put_u16_be, put_u16_le, put_u32_be, put_u32_le, read_u16_be, read_u16_le, read_u32_be,
    read_u32_le,
};
pub use sink::{BufferSink, DngSink, StreamSink};
