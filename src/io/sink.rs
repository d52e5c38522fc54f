use std::io::Write;

use bytes::{Bytes, BytesMut};

use crate::error::DngError;

/// Destination for the bytes of a serialized container.
///
/// The layout engine writes strictly front to back. The only exception is
/// a slot reserved with [`reserve`](DngSink::reserve), whose final contents
/// are handed over through [`resolve`](DngSink::resolve) once strip
/// placement is known. Sinks that cannot seek back write the planned
/// contents up front; the engine only calls `resolve` after checking that
/// the placement matched the plan, so both sink kinds end up byte-identical.
pub trait DngSink {
    /// Append bytes at the current position.
    fn put(&mut self, bytes: &[u8]) -> Result<(), DngError>;

    /// Append a strip payload.
    fn put_strip(&mut self, strip: &Bytes) -> Result<(), DngError> {
        self.put(strip)
    }

    /// Number of bytes written so far.
    fn position(&self) -> u64;

    /// Reserve a slot whose final value is only known after strip placement.
    fn reserve(&mut self, planned: &[u8]) -> Result<(), DngError>;

    /// Fill a previously reserved slot starting at absolute `offset`.
    fn resolve(&mut self, offset: u64, resolved: &[u8]) -> Result<(), DngError>;
}

// =============================================================================
// BufferSink
// =============================================================================

/// Growable in-memory sink.
///
/// Reserved slots are zero-filled and patched in place on resolve.
#[derive(Debug, Default)]
pub struct BufferSink {
    buf: BytesMut,
}

impl BufferSink {
    /// Create a sink that pre-allocates `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Freeze the written bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl DngSink for BufferSink {
    fn put(&mut self, bytes: &[u8]) -> Result<(), DngError> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.buf.len() as u64
    }

    fn reserve(&mut self, planned: &[u8]) -> Result<(), DngError> {
        self.buf.resize(self.buf.len() + planned.len(), 0);
        Ok(())
    }

    fn resolve(&mut self, offset: u64, resolved: &[u8]) -> Result<(), DngError> {
        let start = offset as usize;
        let end = start + resolved.len();
        if end > self.buf.len() {
            return Err(DngError::LayoutSizeMismatch {
                stage: "reserved slot",
                predicted: end as u64,
                actual: self.buf.len() as u64,
            });
        }
        self.buf[start..end].copy_from_slice(resolved);
        Ok(())
    }
}

// =============================================================================
// StreamSink
// =============================================================================

/// Forward-only sink over any [`Write`].
///
/// Strip payloads go straight to the writer without an intermediate copy.
pub struct StreamSink<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> StreamSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Flush and return the wrapped writer.
    pub fn into_inner(mut self) -> Result<W, DngError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> DngSink for StreamSink<W> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), DngError> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.written
    }

    fn reserve(&mut self, planned: &[u8]) -> Result<(), DngError> {
        self.put(planned)
    }

    fn resolve(&mut self, offset: u64, resolved: &[u8]) -> Result<(), DngError> {
        // Already written at reserve time; nothing left to do as long as
        // the slot lies behind the cursor.
        let end = offset + resolved.len() as u64;
        if end > self.written {
            return Err(DngError::LayoutSizeMismatch {
                stage: "reserved slot",
                predicted: end,
                actual: self.written,
            });
        }
        Ok(())
    }
}
