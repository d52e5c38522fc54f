//! Directory entries and caller-facing tag sets.
//!
//! [`TagEntry`] is one (tag id, value) pair ready for layout. [`DngTags`] is
//! the metadata a caller configures once and reuses across conversions; it
//! keeps tags unique and ordered, and checks every value against the tag
//! catalog as it is inserted.

use std::collections::BTreeMap;

use crate::error::DngError;

use super::tags::{tag_name, DngTag, FieldType};
use super::values::{Rational, SRational, TagValue};

// =============================================================================
// TagEntry
// =============================================================================

/// A single directory entry awaiting layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TagEntry {
    pub tag: u16,
    pub value: TagValue,
}

impl TagEntry {
    /// Create an entry for a catalog tag, enforcing its declared kind and count.
    pub fn new(tag: DngTag, value: TagValue) -> Result<Self, DngError> {
        check_catalog(tag, &value)?;
        Ok(Self {
            tag: tag.as_u16(),
            value,
        })
    }

    /// Create an entry for an arbitrary tag id without catalog checks.
    pub fn custom(tag: u16, value: TagValue) -> Self {
        Self { tag, value }
    }
}

fn check_catalog(tag: DngTag, value: &TagValue) -> Result<(), DngError> {
    let spec = tag.spec();
    if value.field_type() != spec.field_type {
        return Err(DngError::InvalidTagValue {
            tag: tag.name(),
            message: format!(
                "expected {:?} value, got {:?}",
                spec.field_type,
                value.field_type()
            ),
        });
    }
    if !spec.count.admits(value.count()) {
        return Err(DngError::InvalidTagValue {
            tag: tag.name(),
            message: format!("count {} does not satisfy {:?}", value.count(), spec.count),
        });
    }
    Ok(())
}

fn reserved_conflict(id: u16) -> Result<(), DngError> {
    match DngTag::from_u16(id) {
        Some(tag) if tag.is_reserved() => Err(DngError::ReservedTagConflict {
            tag: tag.name(),
            id,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// DngTags
// =============================================================================

/// Caller-supplied DNG metadata.
///
/// Tags are unique by id and iterate in ascending order. Tags the encoder
/// writes itself (see [`DngTag::RESERVED`]) are refused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DngTags {
    values: BTreeMap<u16, TagValue>,
}

impl DngTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a catalog tag, replacing any previous value.
    pub fn set(&mut self, tag: DngTag, value: TagValue) -> Result<&mut Self, DngError> {
        reserved_conflict(tag.as_u16())?;
        check_catalog(tag, &value)?;
        self.values.insert(tag.as_u16(), value);
        Ok(self)
    }

    /// Set a tag outside the catalog (private or vendor tags).
    ///
    /// Catalog ids are still checked against their declared encoding.
    pub fn set_custom(&mut self, id: u16, value: TagValue) -> Result<&mut Self, DngError> {
        match DngTag::from_u16(id) {
            Some(tag) => self.set(tag, value),
            None => {
                self.values.insert(id, value);
                Ok(self)
            }
        }
    }

    /// Set a single integer, encoded as the tag's declared SHORT/LONG/BYTE type.
    pub fn set_u32(&mut self, tag: DngTag, value: u32) -> Result<&mut Self, DngError> {
        self.set_u32s(tag, &[value])
    }

    /// Set an integer array, encoded as the tag's declared SHORT/LONG/BYTE type.
    pub fn set_u32s(&mut self, tag: DngTag, values: &[u32]) -> Result<&mut Self, DngError> {
        let out_of_range = |limit: u32| DngError::InvalidTagValue {
            tag: tag.name(),
            message: format!("value exceeds {} for {:?}", limit, tag.spec().field_type),
        };

        let value = match tag.spec().field_type {
            FieldType::Long => TagValue::Long(values.to_vec()),
            FieldType::Short => TagValue::Short(
                values
                    .iter()
                    .map(|&v| u16::try_from(v).map_err(|_| out_of_range(u16::MAX as u32)))
                    .collect::<Result<_, _>>()?,
            ),
            FieldType::Byte => TagValue::Byte(
                values
                    .iter()
                    .map(|&v| u8::try_from(v).map_err(|_| out_of_range(u8::MAX as u32)))
                    .collect::<Result<_, _>>()?,
            ),
            other => {
                return Err(DngError::InvalidTagValue {
                    tag: tag.name(),
                    message: format!("expected {:?} value, got integers", other),
                })
            }
        };
        self.set(tag, value)
    }

    /// Set unsigned rationals from (numerator, denominator) pairs.
    pub fn set_rationals(
        &mut self,
        tag: DngTag,
        values: &[(u32, u32)],
    ) -> Result<&mut Self, DngError> {
        let value = TagValue::Rational(values.iter().copied().map(Rational::from).collect());
        self.set(tag, value)
    }

    /// Set signed rationals from (numerator, denominator) pairs.
    pub fn set_srationals(
        &mut self,
        tag: DngTag,
        values: &[(i32, i32)],
    ) -> Result<&mut Self, DngError> {
        let value = TagValue::SRational(values.iter().copied().map(SRational::from).collect());
        self.set(tag, value)
    }

    /// Set an ASCII string.
    pub fn set_ascii(&mut self, tag: DngTag, value: &str) -> Result<&mut Self, DngError> {
        self.set(tag, TagValue::Ascii(value.to_string()))
    }

    /// Set a BYTE array.
    pub fn set_bytes(&mut self, tag: DngTag, value: &[u8]) -> Result<&mut Self, DngError> {
        self.set(tag, TagValue::Byte(value.to_vec()))
    }

    /// Remove a tag, returning its previous value.
    pub fn remove(&mut self, tag: DngTag) -> Option<TagValue> {
        self.values.remove(&tag.as_u16())
    }

    pub fn get(&self, tag: DngTag) -> Option<&TagValue> {
        self.values.get(&tag.as_u16())
    }

    /// First element of a SHORT/LONG tag.
    pub fn get_u32(&self, tag: DngTag) -> Option<u32> {
        self.get(tag).and_then(TagValue::first_u32)
    }

    pub fn contains(&self, tag: DngTag) -> bool {
        self.values.contains_key(&tag.as_u16())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate (id, value) pairs in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &TagValue)> {
        self.values.iter().map(|(&id, value)| (id, value))
    }

    /// Copy every tag from `other`, overriding tags present in both.
    pub fn extend(&mut self, other: &DngTags) {
        for (id, value) in other.iter() {
            self.values.insert(id, value.clone());
        }
    }

    /// Clone into directory entries.
    pub fn to_entries(&self) -> Vec<TagEntry> {
        self.iter()
            .map(|(id, value)| TagEntry::custom(id, value.clone()))
            .collect()
    }

    /// Fail if any tag collides with one the encoder injects.
    pub fn check_reserved(&self) -> Result<(), DngError> {
        self.values.keys().try_for_each(|&id| reserved_conflict(id))
    }

    /// Names of the configured tags, for logging.
    pub fn names(&self) -> Vec<String> {
        self.values.keys().map(|&id| tag_name(id)).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
