//! Typed TIFF tag values.
//!
//! A [`TagValue`] is the in-memory form of one directory entry's payload.
//! Its variant fixes the on-disk field type, so the element width and the
//! total byte length are known before any layout is computed.

use std::fmt;

use serde::Serialize;

use super::parser::ByteOrder;
use super::tags::FieldType;

// =============================================================================
// Rationals
// =============================================================================

/// Unsigned numerator/denominator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl From<(u32, u32)> for Rational {
    fn from((numerator, denominator): (u32, u32)) -> Self {
        Self::new(numerator, denominator)
    }
}

/// Signed numerator/denominator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SRational {
    pub numerator: i32,
    pub denominator: i32,
}

impl SRational {
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl From<(i32, i32)> for SRational {
    fn from((numerator, denominator): (i32, i32)) -> Self {
        Self::new(numerator, denominator)
    }
}

// =============================================================================
// TagValue
// =============================================================================

/// Payload of a single directory entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TagValue {
    Byte(Vec<u8>),
    /// Stored with a trailing NUL, which counts towards the element count
    Ascii(String),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<Rational>),
    SRational(Vec<SRational>),
    Undefined(Vec<u8>),
}

impl TagValue {
    /// On-disk field type of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            TagValue::Byte(_) => FieldType::Byte,
            TagValue::Ascii(_) => FieldType::Ascii,
            TagValue::Short(_) => FieldType::Short,
            TagValue::Long(_) => FieldType::Long,
            TagValue::Rational(_) => FieldType::Rational,
            TagValue::SRational(_) => FieldType::SRational,
            TagValue::Undefined(_) => FieldType::Undefined,
        }
    }

    /// Element count as written in the entry's count field.
    pub fn count(&self) -> usize {
        match self {
            TagValue::Byte(v) | TagValue::Undefined(v) => v.len(),
            TagValue::Ascii(s) => {
                if s.ends_with('\0') {
                    s.len()
                } else {
                    s.len() + 1
                }
            }
            TagValue::Short(v) => v.len(),
            TagValue::Long(v) => v.len(),
            TagValue::Rational(v) => v.len(),
            TagValue::SRational(v) => v.len(),
        }
    }

    /// Total encoded length in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.count() * self.field_type().size_in_bytes()
    }

    /// Whether the value fits in the 4-byte field of a directory entry.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.field_type().fits_inline(self.count() as u64)
    }

    /// Append the encoded value to `out`.
    ///
    /// Appends exactly [`byte_len`](Self::byte_len) bytes.
    pub fn encode(&self, order: ByteOrder, out: &mut Vec<u8>) {
        match self {
            TagValue::Byte(v) | TagValue::Undefined(v) => out.extend_from_slice(v),
            TagValue::Ascii(s) => {
                out.extend_from_slice(s.as_bytes());
                if !s.ends_with('\0') {
                    out.push(0);
                }
            }
            TagValue::Short(v) => v.iter().for_each(|&x| order.put_u16(out, x)),
            TagValue::Long(v) => v.iter().for_each(|&x| order.put_u32(out, x)),
            TagValue::Rational(v) => {
                for r in v {
                    order.put_u32(out, r.numerator);
                    order.put_u32(out, r.denominator);
                }
            }
            TagValue::SRational(v) => {
                for r in v {
                    order.put_u32(out, r.numerator as u32);
                    order.put_u32(out, r.denominator as u32);
                }
            }
        }
    }

    /// Decode `count` elements of `field_type` from raw entry bytes.
    ///
    /// `bytes` must hold at least `count * field_type.size_in_bytes()` bytes.
    pub fn decode(field_type: FieldType, count: usize, bytes: &[u8], order: ByteOrder) -> Self {
        let width = field_type.size_in_bytes();
        let raw = &bytes[..count * width];
        match field_type {
            FieldType::Byte => TagValue::Byte(raw.to_vec()),
            FieldType::Undefined => TagValue::Undefined(raw.to_vec()),
            FieldType::Ascii => {
                let text = raw.strip_suffix(&[0]).unwrap_or(raw);
                TagValue::Ascii(String::from_utf8_lossy(text).into_owned())
            }
            FieldType::Short => {
                TagValue::Short(raw.chunks_exact(2).map(|c| order.read_u16(c)).collect())
            }
            FieldType::Long => {
                TagValue::Long(raw.chunks_exact(4).map(|c| order.read_u32(c)).collect())
            }
            FieldType::Rational => TagValue::Rational(
                raw.chunks_exact(8)
                    .map(|c| Rational::new(order.read_u32(&c[..4]), order.read_u32(&c[4..])))
                    .collect(),
            ),
            FieldType::SRational => TagValue::SRational(
                raw.chunks_exact(8)
                    .map(|c| {
                        SRational::new(
                            order.read_u32(&c[..4]) as i32,
                            order.read_u32(&c[4..]) as i32,
                        )
                    })
                    .collect(),
            ),
        }
    }

    /// First element as an unsigned integer, for SHORT and LONG values.
    pub fn first_u32(&self) -> Option<u32> {
        match self {
            TagValue::Short(v) => v.first().map(|&x| x as u32),
            TagValue::Long(v) => v.first().copied(),
            _ => None,
        }
    }

    /// All elements as unsigned integers, for SHORT and LONG values.
    pub fn as_u32s(&self) -> Option<Vec<u32>> {
        match self {
            TagValue::Short(v) => Some(v.iter().map(|&x| x as u32).collect()),
            TagValue::Long(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    /// Compact rendering; long arrays are elided after eight elements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 8;

        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            write!(f, "[")?;
            for (i, item) in items.iter().take(SHOWN).enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            if items.len() > SHOWN {
                write!(f, ", ... ({} total)", items.len())?;
            }
            write!(f, "]")
        }

        match self {
            TagValue::Ascii(s) => write!(f, "{:?}", s.trim_end_matches('\0')),
            TagValue::Byte(v) | TagValue::Undefined(v) => list(f, v),
            TagValue::Short(v) => list(f, v),
            TagValue::Long(v) => list(f, v),
            TagValue::Rational(v) => {
                let rendered: Vec<String> = v
                    .iter()
                    .map(|r| format!("{}/{}", r.numerator, r.denominator))
                    .collect();
                list(f, &rendered)
            }
            TagValue::SRational(v) => {
                let rendered: Vec<String> = v
                    .iter()
                    .map(|r| format!("{}/{}", r.numerator, r.denominator))
                    .collect();
                list(f, &rendered)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
