//! # TLV Codec
//!
//! Wire layout of one element:
//!
//! ```text
//! 8-bit form : [0][N][F][type:5]           [len:8]          value
//! 16-bit form: [1][N][F][type hi:5][type lo:8] [len hi:8][len lo:8] value
//! ```
//!
//! The writer picks the 16-bit form when the type does not fit in five
//! bits or the value is longer than 255 bytes. Value length ceilings are
//! 255 bytes in the 8-bit form and 65535 bytes in the 16-bit form.

use std::io::{ErrorKind, Read, Write};

use crate::errors::{Result, TlvError};
use crate::tag::Tag;

/// 16-bit form flag.
pub const TLV16_FLAG: u8 = 0x80;
/// Non-critical flag.
pub const NON_CRITICAL_FLAG: u8 = 0x40;
/// Forward flag.
pub const FORWARD_FLAG: u8 = 0x20;
/// Type bits of the first byte.
pub const TYPE_MASK: u8 = 0x1F;
/// Largest representable type (13 bits).
pub const MAX_TYPE: u32 = 0x1FFF;
/// Value length ceiling of the 8-bit form.
pub const MAX_SHORT_LEN: usize = 0xFF;
/// Value length ceiling of the 16-bit form.
pub const MAX_LONG_LEN: usize = 0xFFFF;

/// Reads TLV elements from a byte stream.
pub struct TlvReader<R: Read> {
    inner: R,
}

impl<R: Read> TlvReader<R> {
    /// Wrap a stream.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read the next element; `None` at a clean end of stream.
    pub fn read_tag(&mut self) -> Result<Option<Tag>> {
        let first = match self.read_first_byte()? {
            Some(b) => b,
            None => return Ok(None),
        };

        let non_critical = first & NON_CRITICAL_FLAG != 0;
        let forward = first & FORWARD_FLAG != 0;
        let mut tag_type = u32::from(first & TYPE_MASK);

        let len = if first & TLV16_FLAG != 0 {
            let mut rest = [0u8; 3];
            self.fill(&mut rest, "16-bit header")?;
            tag_type = (tag_type << 8) | u32::from(rest[0]);
            usize::from(u16::from_be_bytes([rest[1], rest[2]]))
        } else {
            let mut len = [0u8; 1];
            self.fill(&mut len, "length")?;
            usize::from(len[0])
        };

        let mut value = vec![0u8; len];
        self.fill(&mut value, "value")?;
        Ok(Some(Tag::raw(tag_type, non_critical, forward, value)))
    }

    /// Read elements until the end of the stream.
    pub fn read_all(&mut self) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        while let Some(tag) = self.read_tag()? {
            tags.push(tag);
        }
        Ok(tags)
    }

    /// Borrow the wrapped stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Release the wrapped stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_first_byte(&mut self) -> Result<Option<u8>> {
        let mut b = [0u8; 1];
        loop {
            match self.inner.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(b[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn fill(&mut self, buf: &mut [u8], context: &'static str) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => TlvError::Truncated { context },
            _ => TlvError::Io(e),
        })
    }
}

/// Writes TLV elements to a byte sink.
pub struct TlvWriter<W: Write> {
    inner: W,
}

impl<W: Write> TlvWriter<W> {
    /// Wrap a sink.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Encode and write one element.
    pub fn write_tag(&mut self, tag: &Tag) -> Result<()> {
        let mut buf = Vec::new();
        write_tag(&mut buf, tag)?;
        self.inner.write_all(&buf)?;
        Ok(())
    }

    /// Release the wrapped sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Append the encoding of `tag` to `out`.
pub fn write_tag(out: &mut Vec<u8>, tag: &Tag) -> Result<()> {
    let tag_type = tag.tag_type();
    if tag_type > MAX_TYPE {
        return Err(TlvError::TypeOutOfRange(tag_type));
    }

    let value = tag.encode_value()?;
    let tlv16 = tag_type > u32::from(TYPE_MASK) || value.len() > MAX_SHORT_LEN;

    let mut first = 0u8;
    if tag.non_critical() {
        first |= NON_CRITICAL_FLAG;
    }
    if tag.forward() {
        first |= FORWARD_FLAG;
    }

    if tlv16 {
        if value.len() > MAX_LONG_LEN {
            return Err(TlvError::ValueTooLong {
                len: value.len(),
                max: MAX_LONG_LEN,
            });
        }
        let [_, _, hi, lo] = tag_type.to_be_bytes();
        let [len_hi, len_lo] = (value.len() as u16).to_be_bytes();
        out.extend_from_slice(&[TLV16_FLAG | first | (hi & TYPE_MASK), lo, len_hi, len_lo]);
    } else {
        out.extend_from_slice(&[first | tag_type as u8, value.len() as u8]);
    }
    out.extend_from_slice(&value);
    Ok(())
}

/// Decode exactly one element spanning all of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<Tag> {
    let mut reader = TlvReader::new(bytes);
    let tag = reader.read_tag()?.ok_or(TlvError::Truncated { context: "header" })?;
    let rest = reader.into_inner();
    if !rest.is_empty() {
        return Err(TlvError::TrailingBytes(rest.len()));
    }
    Ok(tag)
}

/// Decode a concatenation of elements.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Tag>> {
    TlvReader::new(bytes).read_all()
}
