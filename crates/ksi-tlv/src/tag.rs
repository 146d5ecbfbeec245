//! # Tag Model
//!
//! A TLV element is a [`Tag`]: type and flags plus a [`TagValue`] that is one
//! of a closed set of kinds. Tags read off the wire start as
//! [`TagValue::Raw`] and are promoted to a typed kind by the structure that
//! understands them.
//!
//! Equality compares kind, type, flags and value. Within a kind the value
//! comparison is equivalent to comparing encoded bytes (integers are always
//! minimal, strings and imprints are stored exactly), so two tags are equal
//! iff they are the same kind and encode identically. A raw tag is never
//! equal to a typed tag, even with identical bytes.

use std::fmt;

use ksi_crypto::DataHash;

use crate::codec;
use crate::errors::{Result, TlvError};

/// Value of a TLV element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TagValue {
    /// Opaque bytes.
    Raw(Vec<u8>),
    /// Unsigned integer, minimal big-endian on the wire.
    Integer(u64),
    /// UTF-8 text, NUL terminated on the wire.
    String(String),
    /// Hash imprint.
    Imprint(DataHash),
    /// Nested tags in original order.
    Composite(Vec<Tag>),
}

/// A TLV element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    tag_type: u32,
    non_critical: bool,
    forward: bool,
    value: TagValue,
}

impl Tag {
    /// Create a tag from parts.
    pub fn new(tag_type: u32, non_critical: bool, forward: bool, value: TagValue) -> Self {
        Self {
            tag_type,
            non_critical,
            forward,
            value,
        }
    }

    /// Raw tag.
    pub fn raw(tag_type: u32, non_critical: bool, forward: bool, bytes: Vec<u8>) -> Self {
        Self::new(tag_type, non_critical, forward, TagValue::Raw(bytes))
    }

    /// Integer tag.
    pub fn integer(tag_type: u32, non_critical: bool, forward: bool, value: u64) -> Self {
        Self::new(tag_type, non_critical, forward, TagValue::Integer(value))
    }

    /// String tag.
    pub fn string(tag_type: u32, non_critical: bool, forward: bool, value: impl Into<String>) -> Self {
        Self::new(tag_type, non_critical, forward, TagValue::String(value.into()))
    }

    /// Imprint tag.
    pub fn imprint(tag_type: u32, non_critical: bool, forward: bool, hash: DataHash) -> Self {
        Self::new(tag_type, non_critical, forward, TagValue::Imprint(hash))
    }

    /// Composite tag.
    pub fn composite(tag_type: u32, non_critical: bool, forward: bool, children: Vec<Tag>) -> Self {
        Self::new(tag_type, non_critical, forward, TagValue::Composite(children))
    }

    /// Tag type.
    pub fn tag_type(&self) -> u32 {
        self.tag_type
    }

    /// Non-critical flag.
    pub fn non_critical(&self) -> bool {
        self.non_critical
    }

    /// Forward flag.
    pub fn forward(&self) -> bool {
        self.forward
    }

    /// Value.
    pub fn value(&self) -> &TagValue {
        &self.value
    }

    /// Fail unless the tag has the expected type.
    pub fn expect_type(&self, expected: u32) -> Result<()> {
        if self.tag_type != expected {
            return Err(TlvError::TypeMismatch {
                expected,
                actual: self.tag_type,
            });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Encoding
    // -------------------------------------------------------------------------

    /// Encoded value bytes (without the TLV header).
    pub fn encode_value(&self) -> Result<Vec<u8>> {
        match &self.value {
            TagValue::Raw(bytes) => Ok(bytes.clone()),
            TagValue::Integer(v) => Ok(encode_u64(*v)),
            TagValue::String(s) => {
                let mut out = Vec::with_capacity(s.len() + 1);
                out.extend_from_slice(s.as_bytes());
                out.push(0);
                Ok(out)
            }
            TagValue::Imprint(hash) => Ok(hash.imprint()),
            TagValue::Composite(children) => {
                let mut out = Vec::new();
                for child in children {
                    codec::write_tag(&mut out, child)?;
                }
                Ok(out)
            }
        }
    }

    /// Full TLV encoding.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        codec::write_tag(&mut out, self)?;
        Ok(out)
    }

    /// Decode exactly one tag from `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Tag> {
        codec::decode(bytes)
    }

    // -------------------------------------------------------------------------
    // Typed reads
    // -------------------------------------------------------------------------

    /// Read the value as an unsigned integer.
    pub fn as_u64(&self) -> Result<u64> {
        match &self.value {
            TagValue::Integer(v) => Ok(*v),
            TagValue::Raw(bytes) => decode_u64(self.tag_type, bytes),
            _ => Err(self.wrong_kind("integer")),
        }
    }

    /// Read the value as a string.
    pub fn as_string(&self) -> Result<String> {
        match &self.value {
            TagValue::String(s) => Ok(s.clone()),
            TagValue::Raw(bytes) => decode_string(self.tag_type, bytes),
            _ => Err(self.wrong_kind("string")),
        }
    }

    /// Read the value as an imprint.
    pub fn as_imprint(&self) -> Result<DataHash> {
        match &self.value {
            TagValue::Imprint(hash) => Ok(hash.clone()),
            TagValue::Raw(bytes) => {
                DataHash::from_imprint(bytes).map_err(|source| TlvError::InvalidImprint {
                    tag_type: self.tag_type,
                    source,
                })
            }
            _ => Err(self.wrong_kind("imprint")),
        }
    }

    /// Read the value as raw bytes.
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        match &self.value {
            TagValue::Raw(bytes) => Ok(bytes.clone()),
            _ => Err(self.wrong_kind("raw bytes")),
        }
    }

    /// Children of a composite, parsing the raw value if needed.
    pub fn children(&self) -> Result<Vec<Tag>> {
        match &self.value {
            TagValue::Composite(children) => Ok(children.clone()),
            TagValue::Raw(bytes) => codec::decode_all(bytes),
            _ => Err(self.wrong_kind("composite")),
        }
    }

    /// Replace the child at `index` of a composite tag.
    pub fn replace_child(&mut self, index: usize, child: Tag) -> Result<Tag> {
        let tag_type = self.tag_type;
        match &mut self.value {
            TagValue::Composite(children) => {
                let len = children.len();
                let slot = children
                    .get_mut(index)
                    .ok_or(TlvError::IndexOutOfBounds { index, len })?;
                Ok(std::mem::replace(slot, child))
            }
            _ => Err(TlvError::WrongKind {
                tag_type,
                expected: "composite",
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Promotion
    // -------------------------------------------------------------------------

    /// Promote to an integer tag.
    pub fn to_integer(&self) -> Result<Tag> {
        Ok(self.with_value(TagValue::Integer(self.as_u64()?)))
    }

    /// Promote to a string tag.
    pub fn to_string_tag(&self) -> Result<Tag> {
        Ok(self.with_value(TagValue::String(self.as_string()?)))
    }

    /// Promote to an imprint tag.
    pub fn to_imprint(&self) -> Result<Tag> {
        Ok(self.with_value(TagValue::Imprint(self.as_imprint()?)))
    }

    /// Promote to a composite with the given (already typed) children.
    pub fn to_composite(&self, children: Vec<Tag>) -> Tag {
        self.with_value(TagValue::Composite(children))
    }

    fn with_value(&self, value: TagValue) -> Tag {
        Tag::new(self.tag_type, self.non_critical, self.forward, value)
    }

    fn wrong_kind(&self, expected: &'static str) -> TlvError {
        TlvError::WrongKind {
            tag_type: self.tag_type,
            expected,
        }
    }
}

/// Minimal big-endian encoding; zero encodes as no bytes.
pub fn encode_u64(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    bytes[skip..].to_vec()
}

/// Decode a minimal big-endian integer of at most eight bytes.
pub fn decode_u64(tag_type: u32, bytes: &[u8]) -> Result<u64> {
    if bytes.len() > 8 {
        return Err(TlvError::IntegerTooLong {
            tag_type,
            len: bytes.len(),
        });
    }
    if bytes.first() == Some(&0) {
        return Err(TlvError::NonMinimalInteger(tag_type));
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

fn decode_string(tag_type: u32, bytes: &[u8]) -> Result<String> {
    match bytes.split_last() {
        Some((&0, text)) => {
            String::from_utf8(text.to_vec()).map_err(|_| TlvError::InvalidUtf8(tag_type))
        }
        _ => Err(TlvError::MissingNul(tag_type)),
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TLV[0x{:X}", self.tag_type)?;
        if self.non_critical {
            f.write_str(",N")?;
        }
        if self.forward {
            f.write_str(",F")?;
        }
        f.write_str("]:")?;
        match &self.value {
            TagValue::Raw(bytes) => write!(f, "0x{}", hex::encode_upper(bytes)),
            TagValue::Integer(v) => write!(f, "i{}", v),
            TagValue::String(s) => write!(f, "\"{}\"", s),
            TagValue::Imprint(hash) => write!(f, "0x{}", hex::encode_upper(hash.imprint())),
            TagValue::Composite(children) => {
                for child in children {
                    write!(f, "\n  {}", child.to_string().replace('\n', "\n  "))?;
                }
                Ok(())
            }
        }
    }
}
