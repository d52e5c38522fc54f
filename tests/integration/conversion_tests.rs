//! End-to-end conversion tests.
//!
//! Tests verify:
//! - Strip sizes for packed and native bit depths
//! - Packed strips decode back to the original samples
//! - Float frames get floating point metadata
//! - Buffered and streamed conversions are byte-identical
//! - Configuration and frame errors surface with the right kind

use raw2dng::codec;
use raw2dng::{
    CameraProfile, ConvertOutput, Destination, DngConverter, DngError, DngTag, DngTags,
    ElementType, SampleBuffer, TagValue,
};

use super::test_utils::{
    base_tags, bayer_tags, gradient_f32, gradient_u16, parse, single_strip, tag_ids,
};

fn converter(tags: DngTags) -> DngConverter {
    DngConverter::new(tags, ".").unwrap()
}

// =============================================================================
// Strip Sizes
// =============================================================================

#[test]
fn test_14_bit_full_groups() {
    let frame = gradient_u16(100, 100, 14);
    let bytes = converter(bayer_tags(100, 100, 14)).to_bytes(&frame).unwrap();

    let strip = single_strip(&bytes);
    assert_eq!(strip.len(), 175 * 100);

    let file = parse(&bytes);
    assert_eq!(file.ifds[0].get_u32(DngTag::StripByteCounts), Some(17500));
}

#[test]
fn test_14_bit_ragged_width() {
    let frame = gradient_u16(3, 101, 14);
    let bytes = converter(base_tags(101, 3, 14)).to_bytes(&frame).unwrap();
    assert_eq!(single_strip(&bytes).len(), 177 * 3);
}

#[test]
fn test_12_bit_single_group() {
    let frame = SampleBuffer::from_u16(1, 2, vec![0xABC, 0x123]).unwrap();
    let bytes = converter(base_tags(2, 1, 12)).to_bytes(&frame).unwrap();
    assert_eq!(single_strip(&bytes), vec![0xAB, 0xC1, 0x23]);
}

#[test]
fn test_8_bit_truncates() {
    let frame = SampleBuffer::from_u16(1, 3, vec![0x0102, 0x00FF, 0xFF00]).unwrap();
    let bytes = converter(base_tags(3, 1, 8)).to_bytes(&frame).unwrap();
    assert_eq!(single_strip(&bytes), vec![0x02, 0xFF, 0x00]);
}

#[test]
fn test_16_bit_native_both_orders() {
    let frame = SampleBuffer::from_u16(1, 2, vec![0x1234, 0xABCD]).unwrap();

    let le = converter(base_tags(2, 1, 16)).to_bytes(&frame).unwrap();
    assert_eq!(single_strip(&le), vec![0x34, 0x12, 0xCD, 0xAB]);

    let be = converter(base_tags(2, 1, 16))
        .with_byte_order(raw2dng::ByteOrder::BigEndian)
        .to_bytes(&frame)
        .unwrap();
    assert_eq!(single_strip(&be), vec![0x12, 0x34, 0xAB, 0xCD]);
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_packed_strips_decode_to_input() {
    for bits in codec::PACKED_BIT_DEPTHS {
        for width in [4usize, 6, 9, 33] {
            let height = 5;
            let frame = gradient_u16(height, width, bits as u32);
            let conv = converter(base_tags(width as u32, height as u32, bits as u32));
            let bytes = conv.to_bytes(&frame).unwrap();

            let strip = single_strip(&bytes);
            assert_eq!(strip.len(), codec::packed_row_len(width, bits) * height);

            let decoded = codec::unpack(&strip, width, height, bits).unwrap();
            assert_eq!(
                decoded,
                frame.as_u16().unwrap(),
                "bits={} width={}",
                bits,
                width
            );
        }
    }
}

#[test]
fn test_out_of_range_samples_are_masked() {
    let frame = SampleBuffer::from_u16(1, 4, vec![0xFFFF, 0, 0xFFFF, 0]).unwrap();
    let bytes = converter(base_tags(4, 1, 10)).to_bytes(&frame).unwrap();

    let decoded = codec::unpack(&single_strip(&bytes), 4, 1, 10).unwrap();
    assert_eq!(decoded, vec![0x3FF, 0, 0x3FF, 0]);
}

#[test]
fn test_trailing_axes_folded_into_rows() {
    let frame = SampleBuffer::new(vec![2, 2, 3], (0..12).collect::<Vec<u16>>()).unwrap();
    let mut tags = base_tags(2, 2, 12);
    tags.set_u32(DngTag::SamplesPerPixel, 3).unwrap();

    let bytes = converter(tags).to_bytes(&frame).unwrap();
    let decoded = codec::unpack(&single_strip(&bytes), 6, 2, 12).unwrap();
    assert_eq!(decoded, (0..12).collect::<Vec<u16>>());

    let file = parse(&bytes);
    assert_eq!(
        file.ifds[0].get_u32s(DngTag::SampleFormat),
        Some(vec![1, 1, 1])
    );
}

// =============================================================================
// Metadata
// =============================================================================

#[test]
fn test_injected_tags_for_integer_frames() {
    let frame = gradient_u16(4, 4, 12);
    let bytes = converter(bayer_tags(4, 4, 12)).to_bytes(&frame).unwrap();
    let file = parse(&bytes);
    let ifd = &file.ifds[0];

    assert_eq!(ifd.get_u32(DngTag::NewSubfileType), Some(0));
    assert_eq!(ifd.get_u32(DngTag::Compression), Some(1));
    assert_eq!(ifd.get_u32(DngTag::SampleFormat), Some(1));
    assert_eq!(
        ifd.get_entry_by_tag(DngTag::DngVersion).unwrap().value,
        TagValue::Byte(vec![1, 4, 0, 0])
    );
    assert_eq!(
        ifd.get_entry_by_tag(DngTag::DngBackwardVersion).unwrap().value,
        TagValue::Byte(vec![1, 0, 0, 0])
    );
    match &ifd.get_entry_by_tag(DngTag::Software).unwrap().value {
        TagValue::Ascii(software) => assert!(software.starts_with("raw2dng ")),
        other => panic!("unexpected Software value {:?}", other),
    }
}

#[test]
fn test_float_frame_metadata() {
    let frame = gradient_f32(3, 5);
    let bytes = converter(bayer_tags(5, 3, 32)).to_bytes(&frame).unwrap();
    let file = parse(&bytes);
    let ifd = &file.ifds[0];

    assert_eq!(ifd.get_u32(DngTag::SampleFormat), Some(3));
    assert_eq!(
        ifd.get_entry_by_tag(DngTag::DngBackwardVersion).unwrap().value,
        TagValue::Byte(vec![1, 4, 0, 0])
    );

    let strip = single_strip(&bytes);
    assert_eq!(strip.len(), 3 * 5 * 4);
    let first = f32::from_le_bytes([strip[4], strip[5], strip[6], strip[7]]);
    assert_eq!(first, 1.0 / 7.0);
}

#[test]
fn test_caller_tags_survive() {
    let frame = gradient_u16(2, 2, 14);
    let bytes = converter(bayer_tags(2, 2, 14)).to_bytes(&frame).unwrap();
    let file = parse(&bytes);
    let ifd = &file.ifds[0];

    assert_eq!(ifd.get_u32(DngTag::PhotometricInterpretation), Some(32803));
    assert_eq!(ifd.get_u32(DngTag::WhiteLevel), Some(16383));
    assert_eq!(
        ifd.get_entry_by_tag(DngTag::CfaPattern).unwrap().value,
        TagValue::Byte(vec![0, 1, 1, 2])
    );
    match &ifd.get_entry_by_tag(DngTag::ColorMatrix1).unwrap().value {
        TagValue::SRational(values) => {
            assert_eq!(values.len(), 9);
            assert_eq!(values[1].numerator, -44861874);
        }
        other => panic!("unexpected ColorMatrix1 value {:?}", other),
    }
}

#[test]
fn test_directory_is_sorted() {
    let frame = gradient_u16(2, 2, 12);
    let bytes = converter(bayer_tags(2, 2, 12)).to_bytes(&frame).unwrap();
    let ids = tag_ids(&bytes);
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids {:?}", ids);
}

#[test]
fn test_profile_driven_conversion() {
    let profile = CameraProfile::from_json(
        r#"{"make": "Acme", "model": "P1", "cfa_pattern": "GRBG", "white_level": 1023}"#,
    )
    .unwrap()
    .with_geometry(8, 2, 10);

    let conv = DngConverter::from_model(&profile, ".").unwrap();
    let bytes = conv.to_bytes(&gradient_u16(2, 8, 10)).unwrap();
    let file = parse(&bytes);
    assert_eq!(
        file.ifds[0].get_entry_by_tag(DngTag::UniqueCameraModel).unwrap().value,
        TagValue::Ascii("Acme P1".into())
    );
    assert_eq!(single_strip(&bytes).len(), 10 * 2);
}

// =============================================================================
// Buffered vs Streamed
// =============================================================================

#[test]
fn test_stream_parity() {
    let frame = gradient_u16(7, 13, 14);
    let conv = converter(bayer_tags(13, 7, 14));

    let buffered = conv.to_bytes(&frame).unwrap();

    let mut streamed = Vec::new();
    let written = conv.to_writer(&frame, &mut streamed).unwrap();

    assert_eq!(written, buffered.len() as u64);
    assert_eq!(streamed, buffered.to_vec());
}

#[test]
fn test_stream_destination_parity_big_endian() {
    let frame = gradient_f32(4, 4);
    let conv =
        converter(bayer_tags(4, 4, 32)).with_byte_order(raw2dng::ByteOrder::BigEndian);

    let ConvertOutput::Bytes(buffered) = conv.convert(&frame, Destination::Buffer).unwrap() else {
        panic!("expected bytes");
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    let output = conv
        .convert(&frame, Destination::Stream(&mut cursor))
        .unwrap();
    assert_eq!(output, ConvertOutput::Streamed(buffered.len() as u64));
    assert_eq!(cursor.into_inner(), buffered.to_vec());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_configuration_fails_fast() {
    for missing in [DngTag::ImageWidth, DngTag::ImageLength, DngTag::BitsPerSample] {
        let mut tags = base_tags(4, 4, 16);
        tags.remove(missing);
        match DngConverter::new(tags, ".") {
            Err(DngError::MissingRequiredTag(name)) => assert_eq!(name, missing.name()),
            other => panic!("expected MissingRequiredTag, got {:?}", other),
        }
    }
}

#[test]
fn test_reserved_tags_refused_by_tag_set() {
    let mut tags = base_tags(4, 4, 16);
    for reserved in DngTag::RESERVED {
        let value = TagValue::Long(vec![0]);
        assert!(matches!(
            tags.set_custom(reserved.as_u16(), value),
            Err(DngError::ReservedTagConflict { .. }) | Err(DngError::InvalidTagValue { .. })
        ));
    }
    assert!(DngConverter::new(tags, ".").is_ok());
}

#[test]
fn test_shape_mismatch() {
    let conv = converter(base_tags(4, 2, 16));
    let result = conv.to_bytes(&gradient_u16(4, 2, 16));
    assert!(matches!(result, Err(DngError::ShapeMismatch { .. })));
}

#[test]
fn test_unsupported_element_type() {
    let frame = SampleBuffer::new(vec![2, 2], vec![0u32; 4]).unwrap();
    let result = converter(base_tags(2, 2, 16)).to_bytes(&frame);
    assert!(matches!(
        result,
        Err(DngError::InvalidInputFormat(ElementType::U32))
    ));
}

#[test]
fn test_unsupported_bit_depth() {
    let result = converter(base_tags(2, 2, 11)).to_bytes(&gradient_u16(2, 2, 11));
    assert!(matches!(
        result,
        Err(DngError::UnsupportedBitDepth { bits: 11, .. })
    ));
}

#[test]
fn test_filter_contract_violation() {
    let conv = converter(base_tags(2, 2, 16))
        .with_filter(|frame| SampleBuffer::from_u16(1, 4, frame.as_u16().unwrap().to_vec()).unwrap());
    let result = conv.to_bytes(&gradient_u16(2, 2, 16));
    assert!(matches!(result, Err(DngError::FilterContractViolation(_))));
}
