//! Layout engine tests on hand-built containers.
//!
//! Tests verify:
//! - Planned sizes and offsets match the emitted bytes
//! - Entries are ascending and out-of-line values sit at even offsets
//! - Multi-directory chains and multi-strip directories resolve correctly
//! - Both byte orders and both sinks agree

use bytes::Bytes;
use raw2dng::format::tiff::{Placement, TIFF_HEADER_SIZE};
use raw2dng::{
    container_to_bytes, stream_container, write_container, BufferSink, ByteOrder, Container,
    Directory, DngError, DngTag, Layout, TagEntry, TagValue,
};

use super::test_utils::parse;

/// Entries with every placement kind: inline short, inline ASCII, long
/// ASCII, an odd-length byte blob and rationals.
fn mixed_entries() -> Vec<TagEntry> {
    vec![
        TagEntry::new(DngTag::ImageWidth, TagValue::Long(vec![3])).unwrap(),
        TagEntry::new(DngTag::ImageLength, TagValue::Long(vec![2])).unwrap(),
        TagEntry::new(DngTag::BitsPerSample, TagValue::Short(vec![8])).unwrap(),
        TagEntry::new(DngTag::Make, TagValue::Ascii("Ac".into())).unwrap(),
        TagEntry::new(DngTag::Model, TagValue::Ascii("Odd length model".into())).unwrap(),
        TagEntry::custom(50000, TagValue::Undefined(vec![9; 7])),
        TagEntry::new(
            DngTag::XResolution,
            TagValue::Rational(vec![(300, 1).into()]),
        )
        .unwrap(),
    ]
}

fn mixed_container(order: ByteOrder) -> Container {
    let directory = Directory::new(
        mixed_entries(),
        vec![Bytes::from_static(&[1, 2, 3, 4, 5, 6])],
    )
    .unwrap();
    Container::single(order, directory)
}

// =============================================================================
// Plan vs Emission
// =============================================================================

#[test]
fn test_planned_size_matches_output() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let container = mixed_container(order);
        let layout = Layout::plan(&container).unwrap();
        let bytes = container_to_bytes(&container).unwrap();
        assert_eq!(bytes.len() as u64, layout.total_len);
    }
}

#[test]
fn test_planned_offsets_match_parsed_file() {
    let container = mixed_container(ByteOrder::LittleEndian);
    let layout = Layout::plan(&container).unwrap();
    let bytes = container_to_bytes(&container).unwrap();
    let file = parse(&bytes);

    assert_eq!(file.header.first_ifd_offset, layout.first_ifd_offset());
    assert_eq!(layout.first_ifd_offset() as usize, TIFF_HEADER_SIZE);

    let planned = &layout.directories[0];
    let parsed = &file.ifds[0];
    assert_eq!(parsed.entries.len(), planned.entries.len());

    for (entry, plan) in parsed.entries.iter().zip(&planned.entries) {
        assert_eq!(entry.tag, plan.tag);
        assert_eq!(entry.count, plan.count);
        match plan.placement {
            Placement::Inline => assert_eq!(entry.value_offset, None),
            Placement::OutOfLine { offset } => assert_eq!(entry.value_offset, Some(offset)),
        }
    }

    assert_eq!(
        parsed.get_u32s(DngTag::StripOffsets),
        Some(planned.strip_offsets.clone())
    );
}

#[test]
fn test_entries_ascending_and_blobs_even() {
    let bytes = container_to_bytes(&mixed_container(ByteOrder::BigEndian)).unwrap();
    let file = parse(&bytes);
    let ifd = &file.ifds[0];

    assert!(ifd.is_sorted());
    for entry in &ifd.entries {
        if let Some(offset) = entry.value_offset {
            assert_eq!(offset % 2, 0, "tag {} at odd offset {}", entry.tag, offset);
        }
    }
    for offset in ifd.get_u32s(DngTag::StripOffsets).unwrap() {
        assert_eq!(offset % 2, 0);
    }
}

#[test]
fn test_values_read_back() {
    let bytes = container_to_bytes(&mixed_container(ByteOrder::BigEndian)).unwrap();
    let file = parse(&bytes);
    let ifd = &file.ifds[0];

    assert_eq!(
        ifd.get_entry_by_tag(DngTag::Make).unwrap().value,
        TagValue::Ascii("Ac".into())
    );
    assert_eq!(
        ifd.get_entry_by_tag(DngTag::Model).unwrap().value,
        TagValue::Ascii("Odd length model".into())
    );
    assert_eq!(ifd.get(50000).unwrap().value, TagValue::Undefined(vec![9; 7]));
    assert_eq!(
        ifd.get_entry_by_tag(DngTag::XResolution).unwrap().value,
        TagValue::Rational(vec![(300, 1).into()])
    );
    assert_eq!(ifd.get_u32(DngTag::StripByteCounts), Some(6));
    assert_eq!(ifd.strips(&bytes).unwrap(), vec![&[1u8, 2, 3, 4, 5, 6][..]]);
}

// =============================================================================
// Multiple Directories and Strips
// =============================================================================

#[test]
fn test_directory_chain() {
    let first = Directory::new(mixed_entries(), vec![Bytes::from_static(&[7; 5])]).unwrap();
    let second = Directory::new(
        vec![TagEntry::new(DngTag::ImageWidth, TagValue::Long(vec![1])).unwrap()],
        vec![Bytes::from_static(&[8; 3])],
    )
    .unwrap();
    let container = Container::new(ByteOrder::LittleEndian, vec![first, second]);

    let layout = Layout::plan(&container).unwrap();
    let bytes = container_to_bytes(&container).unwrap();
    let file = parse(&bytes);

    assert_eq!(file.ifds.len(), 2);
    assert_eq!(file.ifds[0].next_ifd_offset, file.ifds[1].offset);
    assert_eq!(file.ifds[1].offset, layout.directories[1].offset);
    assert_eq!(file.ifds[1].next_ifd_offset, 0);

    assert_eq!(file.ifds[0].strips(&bytes).unwrap(), vec![&[7u8; 5][..]]);
    assert_eq!(file.ifds[1].strips(&bytes).unwrap(), vec![&[8u8; 3][..]]);
}

#[test]
fn test_multi_strip_directory() {
    let strips = vec![
        Bytes::from_static(&[1; 3]),
        Bytes::from_static(&[2; 4]),
        Bytes::from_static(&[3; 1]),
    ];
    let directory = Directory::new(mixed_entries(), strips).unwrap();
    let container = Container::single(ByteOrder::BigEndian, directory);

    let bytes = container_to_bytes(&container).unwrap();
    let file = parse(&bytes);
    let ifd = &file.ifds[0];

    assert_eq!(ifd.get_u32s(DngTag::StripByteCounts), Some(vec![3, 4, 1]));
    assert_eq!(
        ifd.strips(&bytes).unwrap(),
        vec![&[1u8; 3][..], &[2u8; 4][..], &[3u8; 1][..]]
    );
}

#[test]
fn test_directory_rejects_strip_tags() {
    let entries = vec![TagEntry::custom(
        DngTag::StripOffsets.as_u16(),
        TagValue::Long(vec![0]),
    )];
    assert!(matches!(
        Directory::new(entries, Vec::new()),
        Err(DngError::ReservedTagConflict { .. })
    ));
}

#[test]
fn test_directory_rejects_duplicates() {
    let entries = vec![
        TagEntry::custom(50000, TagValue::Byte(vec![1])),
        TagEntry::custom(50000, TagValue::Byte(vec![2])),
    ];
    assert!(matches!(
        Directory::new(entries, Vec::new()),
        Err(DngError::DuplicateTag(50000))
    ));
}

// =============================================================================
// Sinks
// =============================================================================

#[test]
fn test_sinks_agree() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let container = mixed_container(order);
        let buffered = container_to_bytes(&container).unwrap();

        let mut streamed = Vec::new();
        let written = stream_container(&container, &mut streamed).unwrap();

        assert_eq!(written, buffered.len() as u64);
        assert_eq!(streamed, buffered.to_vec());
    }
}

#[test]
fn test_explicit_buffer_sink() {
    let container = mixed_container(ByteOrder::LittleEndian);
    let mut sink = BufferSink::default();
    let written = write_container(&container, &mut sink).unwrap();

    let bytes = sink.into_bytes();
    assert_eq!(written, bytes.len() as u64);
    assert_eq!(bytes, container_to_bytes(&container).unwrap());
}

#[test]
fn test_empty_directory_has_only_strip_tags() {
    let directory = Directory::new(Vec::new(), vec![Bytes::from_static(&[0; 2])]).unwrap();
    let container = Container::single(ByteOrder::LittleEndian, directory);
    let bytes = container_to_bytes(&container).unwrap();

    let ids: Vec<u16> = parse(&bytes).ifds[0].entries.iter().map(|e| e.tag).collect();
    assert_eq!(
        ids,
        vec![
            DngTag::StripOffsets.as_u16(),
            DngTag::StripByteCounts.as_u16()
        ]
    );
}
