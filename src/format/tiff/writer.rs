//! Emission pass of the container writer.
//!
//! [`write_container`] replays a [`Layout`] into a [`DngSink`]. Every blob
//! and strip position is checked against the plan as it is written, and the
//! final byte count must equal [`Layout::total_len`]. A disagreement means
//! the sizing pass miscounted something and is reported as
//! [`DngError::LayoutSizeMismatch`]; it is never silently tolerated.

use std::io::Write;

use bytes::Bytes;
use tracing::debug;

use crate::error::DngError;
use crate::io::{BufferSink, DngSink, StreamSink};

use super::directory::Container;
use super::layout::{EntryValue, Layout, Placement};
use super::parser::{ByteOrder, TiffHeader};
use super::tags::FieldType;

/// Serialize `container` into `sink`, returning the number of bytes written.
pub fn write_container<S: DngSink>(container: &Container, sink: &mut S) -> Result<u64, DngError> {
    let layout = Layout::plan(container)?;
    emit(&layout, container, sink)?;
    Ok(layout.total_len)
}

/// Serialize `container` into a freshly allocated buffer of exactly the
/// planned size.
pub fn container_to_bytes(container: &Container) -> Result<Bytes, DngError> {
    let layout = Layout::plan(container)?;
    let mut sink = BufferSink::with_capacity(layout.total_len as usize);
    emit(&layout, container, &mut sink)?;
    Ok(sink.into_bytes())
}

/// Stream `container` into `writer`, returning the number of bytes written.
///
/// Nothing is written unless the sizing pass succeeds.
pub fn stream_container<W: Write>(container: &Container, writer: W) -> Result<u64, DngError> {
    let layout = Layout::plan(container)?;
    let mut sink = StreamSink::new(writer);
    emit(&layout, container, &mut sink)?;
    sink.into_inner()?;
    Ok(layout.total_len)
}

/// A reserved slot waiting for its resolved contents.
struct PendingSlot {
    directory: usize,
    position: u64,
}

fn check_position<S: DngSink>(sink: &S, stage: &'static str, planned: u64) -> Result<(), DngError> {
    let actual = sink.position();
    if actual != planned {
        return Err(DngError::LayoutSizeMismatch {
            stage,
            predicted: planned,
            actual,
        });
    }
    Ok(())
}

fn pad_even<S: DngSink>(sink: &mut S) -> Result<(), DngError> {
    if sink.position() & 1 == 1 {
        sink.put(&[0])?;
    }
    Ok(())
}

fn encode_u32s(order: ByteOrder, values: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    values.iter().for_each(|&v| order.put_u32(&mut out, v));
    out
}

fn emit<S: DngSink>(layout: &Layout, container: &Container, sink: &mut S) -> Result<(), DngError> {
    let order = layout.byte_order;
    let mut pending = Vec::new();

    let header = TiffHeader {
        byte_order: order,
        first_ifd_offset: layout.first_ifd_offset(),
    };
    sink.put(&header.encode())?;

    for (index, dir) in layout.directories.iter().enumerate() {
        check_position(sink, "directory placement", dir.offset as u64)?;

        // Directory block
        let mut block = Vec::with_capacity(dir.block_size());
        order.put_u16(&mut block, dir.entries.len() as u16);
        let mut inline_slot = None;

        for entry in &dir.entries {
            order.put_u16(&mut block, entry.tag);
            order.put_u16(&mut block, entry.field_type.as_u16());
            order.put_u32(&mut block, entry.count);

            match entry.placement {
                Placement::OutOfLine { offset } => order.put_u32(&mut block, offset),
                Placement::Inline => {
                    let start = block.len();
                    match &entry.value {
                        EntryValue::Fixed(value) => value.encode(order, &mut block),
                        EntryValue::Reserved { .. } => {
                            inline_slot = Some(sink.position() + start as u64);
                        }
                    }
                    block.resize(start + FieldType::INLINE_THRESHOLD, 0);
                }
            }
        }
        order.put_u32(&mut block, dir.next_offset);

        // Inline reserved slots sit inside the block; split around them
        match inline_slot {
            Some(position) => {
                let split = (position - sink.position()) as usize;
                let planned = encode_u32s(order, &dir.strip_offsets);
                sink.put(&block[..split])?;
                sink.reserve(&pad_to_field(planned))?;
                sink.put(&block[split + FieldType::INLINE_THRESHOLD..])?;
                pending.push(PendingSlot {
                    directory: index,
                    position,
                });
            }
            None => sink.put(&block)?,
        }

        // Out-of-line blobs in tag order
        for entry in &dir.entries {
            let Placement::OutOfLine { offset } = entry.placement else {
                continue;
            };
            check_position(sink, "blob placement", offset as u64)?;

            match &entry.value {
                EntryValue::Fixed(value) => {
                    let mut blob = Vec::with_capacity(entry.byte_len as usize);
                    value.encode(order, &mut blob);
                    sink.put(&blob)?;
                }
                EntryValue::Reserved { planned } => {
                    pending.push(PendingSlot {
                        directory: index,
                        position: sink.position(),
                    });
                    sink.reserve(&encode_u32s(order, planned))?;
                }
            }
            pad_even(sink)?;
        }
    }

    // Strips, recording where each one actually lands
    let mut placed: Vec<Vec<u32>> = Vec::with_capacity(container.directories.len());
    for directory in &container.directories {
        let mut offsets = Vec::with_capacity(directory.strips().len());
        for strip in directory.strips() {
            pad_even(sink)?;
            offsets.push(sink.position() as u32);
            sink.put_strip(strip)?;
        }
        placed.push(offsets);
    }

    for (dir, actual) in layout.directories.iter().zip(&placed) {
        for (&planned, &actual) in dir.strip_offsets.iter().zip(actual) {
            if planned != actual {
                return Err(DngError::LayoutSizeMismatch {
                    stage: "strip placement",
                    predicted: planned as u64,
                    actual: actual as u64,
                });
            }
        }
    }

    // Patch StripOffsets with the recorded placements
    for slot in pending {
        let resolved = encode_u32s(order, &placed[slot.directory]);
        let bytes = if resolved.len() < FieldType::INLINE_THRESHOLD {
            pad_to_field(resolved)
        } else {
            resolved
        };
        sink.resolve(slot.position, &bytes)?;
    }

    check_position(sink, "total size", layout.total_len)?;
    debug!(bytes = layout.total_len, "emitted container");
    Ok(())
}

fn pad_to_field(mut bytes: Vec<u8>) -> Vec<u8> {
    bytes.resize(FieldType::INLINE_THRESHOLD, 0);
    bytes
}

// =============================================================================
// Tests
// =============================================================================
