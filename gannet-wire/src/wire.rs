//! TLV primitives shared by every message type.
//!
//! An encoded message is a flat sequence of fields with no outer length
//! prefix (framing belongs to the transport):
//!
//! ```text
//! +--------------------+----------------+--------------------+-----
//! | tag (varint)       | payload        | tag (varint)       | ...
//! | field<<3|wire_type | per wire type  |                    |
//! +--------------------+----------------+--------------------+-----
//! ```
//!
//! Varints are base-128: low-order 7 bits per byte, continuation bit on
//! every byte but the last, least significant group first. Fixed-width
//! payloads are little-endian.

use crate::error::WireError;
use bytes::{BufMut, BytesMut};

/// Longest possible varint: ten 7-bit groups cover 64 bits.
pub const MAX_VARINT_LEN: usize = 10;

/// Payload encoding of a field, carried in the low three bits of its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 variable-length integer.
    Varint = 0,
    /// 8 bytes, little-endian. Carries IEEE-754 doubles by bit pattern.
    Fixed64 = 1,
    /// Varint length followed by that many raw bytes.
    LengthDelimited = 2,
    /// Deprecated group delimiter. Parsed so fields from foreign senders
    /// can be skipped; nothing here emits it.
    StartGroup = 3,
    /// Deprecated group delimiter, see [`WireType::StartGroup`].
    EndGroup = 4,
    /// 4 bytes, little-endian. No current field uses it.
    Fixed32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            _ => Err(WireError::UnknownWireType(value)),
        }
    }
}

/// Returns the number of bytes [`put_uvarint`] writes for `value`.
pub fn uvarint_len(mut value: u64) -> usize {
    let mut n = 1;
    while value >= 0x80 {
        value >>= 7;
        n += 1;
    }
    n
}

/// Appends `value` as a base-128 varint.
pub fn put_uvarint(buf: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8(value as u8 | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Appends 8 little-endian bytes.
pub fn put_fixed64(buf: &mut BytesMut, value: u64) {
    buf.put_u64_le(value);
}

/// Appends 4 little-endian bytes.
pub fn put_fixed32(buf: &mut BytesMut, value: u32) {
    buf.put_u32_le(value);
}

/// Packs a field number and wire type into a tag and appends it.
pub fn put_tag(buf: &mut BytesMut, field: u32, wire_type: WireType) {
    put_uvarint(buf, (u64::from(field) << 3) | wire_type as u64);
}

/// Returns the encoded length of the tag for `field`.
///
/// The wire type lives in the low three bits and never changes the
/// length, so only the field number matters.
pub fn tag_len(field: u32) -> usize {
    uvarint_len(u64::from(field) << 3)
}

/// Bounds-checked cursor over an encoded message.
///
/// Reads never panic on malformed input; every shortfall surfaces as a
/// typed [`WireError`]. The reader only borrows the buffer, and
/// [`read_len_prefixed`](WireReader::read_len_prefixed) hands back
/// subslices of the original input for the caller to copy out of.
#[derive(Debug)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed. Decoders treat this as
    /// their clean stopping condition.
    pub fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::Truncated {
                needed: n,
                available: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..start + n])
    }

    /// Reads one base-128 varint.
    pub fn read_uvarint(&mut self) -> Result<u64, WireError> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            if self.pos == self.data.len() {
                return Err(WireError::Truncated {
                    needed: 1,
                    available: 0,
                });
            }
            let byte = self.data[self.pos];
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte < 0x80 {
                return Ok(value);
            }
        }
        Err(WireError::InvalidVarint)
    }

    /// Reads 8 little-endian bytes.
    pub fn read_fixed64(&mut self) -> Result<u64, WireError> {
        let bytes = self.take(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Reads 4 little-endian bytes.
    pub fn read_fixed32(&mut self) -> Result<u32, WireError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Reads a tag and splits it into field number and wire type.
    ///
    /// Field number zero is rejected; no schema assigns it.
    pub fn read_tag(&mut self) -> Result<(u64, WireType), WireError> {
        let tag = self.read_uvarint()?;
        let wire_type = WireType::try_from((tag & 0x7) as u8)?;
        let field = tag >> 3;
        if field == 0 {
            return Err(WireError::ZeroFieldNumber);
        }
        Ok((field, wire_type))
    }

    /// Reads a varint length and then that many raw bytes.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_uvarint()?;
        if len > i64::MAX as u64 {
            return Err(WireError::NegativeLength(len));
        }
        if len > self.remaining() as u64 {
            return Err(WireError::Truncated {
                needed: len as usize,
                available: self.remaining(),
            });
        }
        self.take(len as usize)
    }

    /// Consumes exactly one field's payload without interpreting it.
    ///
    /// Group delimiters nest; a depth counter replaces recursion so
    /// hostile nesting depth cannot exhaust the stack.
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), WireError> {
        match wire_type {
            WireType::Varint => {
                self.read_uvarint()?;
            }
            WireType::Fixed64 => {
                self.take(8)?;
            }
            WireType::LengthDelimited => {
                self.read_len_prefixed()?;
            }
            WireType::StartGroup => {
                let mut depth = 1usize;
                while depth > 0 {
                    let (_, nested) = self.read_tag()?;
                    match nested {
                        WireType::StartGroup => depth += 1,
                        WireType::EndGroup => depth -= 1,
                        other => self.skip(other)?,
                    }
                }
            }
            // A bare group end consumes nothing beyond its tag.
            WireType::EndGroup => {}
            WireType::Fixed32 => {
                self.take(4)?;
            }
        }
        Ok(())
    }
}
