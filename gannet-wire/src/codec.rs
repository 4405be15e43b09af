//! The [`Message`] trait and shared per-field encode helpers.
//!
//! Encoding is two-pass: [`Message::encoded_size`] predicts the exact
//! byte count, the caller reserves that much, and
//! [`Message::encode_into`] appends precisely that many bytes.
//! [`Message::encode`] ties the passes together and verifies the
//! prediction, so a drifting size computation fails loudly instead of
//! corrupting every field after it.

use crate::error::WireError;
use crate::wire::{self, WireReader, WireType};
use bytes::{BufMut, Bytes, BytesMut};

/// A record that can be put on the wire.
///
/// Implementations append present fields in ascending field-number
/// order and, on decode, skip unrecognized fields rather than failing:
/// a newer peer may legitimately send fields this schema has never
/// heard of.
pub trait Message: Sized {
    /// Exact number of bytes [`Message::encode_into`] appends.
    fn encoded_size(&self) -> usize;

    /// Appends the encoded record to `buf`.
    fn encode_into(&self, buf: &mut BytesMut);

    /// Decodes a record from a buffer holding exactly one encoded
    /// message. Consuming the final byte is the success condition;
    /// a field running past the end is an error, not a short read.
    fn decode(data: &[u8]) -> Result<Self, WireError>;

    /// Encodes into a freshly allocated buffer of exactly
    /// [`Message::encoded_size`] bytes.
    fn encode(&self) -> Result<Bytes, WireError> {
        let expected = self.encoded_size();
        let mut buf = BytesMut::with_capacity(expected);
        self.encode_into(&mut buf);
        debug_assert_eq!(
            buf.len(),
            expected,
            "encoded_size out of sync with encode_into"
        );
        if buf.len() != expected {
            return Err(WireError::SizeMismatch {
                expected,
                actual: buf.len(),
            });
        }
        Ok(buf.freeze())
    }
}

/// Encoded length of a varint field, tag included.
pub fn uvarint_field_len(field: u32, value: u64) -> usize {
    wire::tag_len(field) + wire::uvarint_len(value)
}

/// Appends a tag and varint payload.
pub fn put_uvarint_field(buf: &mut BytesMut, field: u32, value: u64) {
    wire::put_tag(buf, field, WireType::Varint);
    wire::put_uvarint(buf, value);
}

/// Encoded length of a bool field, tag included. Always two bytes.
pub fn bool_field_len(field: u32) -> usize {
    wire::tag_len(field) + 1
}

/// Appends a tag and a one-byte bool payload.
pub fn put_bool_field(buf: &mut BytesMut, field: u32, value: bool) {
    wire::put_tag(buf, field, WireType::Varint);
    wire::put_uvarint(buf, u64::from(value));
}

/// Encoded length of a fixed64 field, tag included.
pub fn fixed64_field_len(field: u32) -> usize {
    wire::tag_len(field) + 8
}

/// Appends a tag and 8 little-endian payload bytes.
pub fn put_fixed64_field(buf: &mut BytesMut, field: u32, value: u64) {
    wire::put_tag(buf, field, WireType::Fixed64);
    wire::put_fixed64(buf, value);
}

/// Encoded length of a length-delimited field, tag and length prefix
/// included.
pub fn bytes_field_len(field: u32, len: usize) -> usize {
    wire::tag_len(field) + wire::uvarint_len(len as u64) + len
}

/// Appends a tag, a length prefix, and the raw bytes.
pub fn put_bytes_field(buf: &mut BytesMut, field: u32, value: &[u8]) {
    wire::put_tag(buf, field, WireType::LengthDelimited);
    wire::put_uvarint(buf, value.len() as u64);
    buf.put_slice(value);
}

/// Appends a tag, a length prefix, and the string's UTF-8 bytes.
pub fn put_str_field(buf: &mut BytesMut, field: u32, value: &str) {
    put_bytes_field(buf, field, value.as_bytes());
}

/// Encoded length of an embedded message field, tag and length prefix
/// included.
pub fn message_field_len<M: Message>(field: u32, msg: &M) -> usize {
    bytes_field_len(field, msg.encoded_size())
}

/// Appends a tag, a length prefix, and the nested message's fields.
pub fn put_message_field<M: Message>(buf: &mut BytesMut, field: u32, msg: &M) {
    wire::put_tag(buf, field, WireType::LengthDelimited);
    wire::put_uvarint(buf, msg.encoded_size() as u64);
    msg.encode_into(buf);
}

/// Checks a decoded wire type against the schema's expectation for the
/// named field.
pub fn expect_wire_type(
    field: &'static str,
    got: WireType,
    want: WireType,
) -> Result<(), WireError> {
    if got != want {
        return Err(WireError::WireTypeMismatch {
            field,
            wire_type: got as u8,
        });
    }
    Ok(())
}

/// Copies a length-delimited string field out of the reader, validating
/// UTF-8.
pub fn read_string_field(
    reader: &mut WireReader<'_>,
    field: &'static str,
) -> Result<String, WireError> {
    let raw = reader.read_len_prefixed()?;
    let s = std::str::from_utf8(raw).map_err(|_| WireError::InvalidUtf8 { field })?;
    Ok(s.to_string())
}
