//! SQL scalar values.

use crate::codec::{self, Message};
use crate::error::WireError;
use crate::wire::{WireReader, WireType};
use bytes::BytesMut;

/// One SQL value: a bound query parameter or a single result cell.
///
/// On the wire a datum carries at most one field, and the field number
/// doubles as the union discriminant. A zero-length encoding is SQL
/// NULL. If a contract-violating peer sends several scalar fields, the
/// last one decoded wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Datum {
    /// SQL NULL. Encodes to zero bytes.
    #[default]
    Null,
    Bool(bool),
    /// Signed 64-bit integer, carried as a plain non-zigzag varint of
    /// its bit pattern. Negative values take the full ten bytes; kept
    /// that way for wire compatibility.
    Int(i64),
    /// IEEE-754 double, carried as its bit pattern in a fixed64.
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Datum::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Bool(v)
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Int(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Float(v)
    }
}

impl From<Vec<u8>> for Datum {
    fn from(v: Vec<u8>) -> Self {
        Datum::Bytes(v)
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Datum::Text(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Text(v.to_string())
    }
}

impl Message for Datum {
    fn encoded_size(&self) -> usize {
        match self {
            Datum::Null => 0,
            Datum::Bool(_) => codec::bool_field_len(1),
            Datum::Int(v) => codec::uvarint_field_len(2, *v as u64),
            Datum::Float(_) => codec::fixed64_field_len(3),
            Datum::Bytes(v) => codec::bytes_field_len(4, v.len()),
            Datum::Text(v) => codec::bytes_field_len(5, v.len()),
        }
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        match self {
            Datum::Null => {}
            Datum::Bool(v) => codec::put_bool_field(buf, 1, *v),
            Datum::Int(v) => codec::put_uvarint_field(buf, 2, *v as u64),
            Datum::Float(v) => codec::put_fixed64_field(buf, 3, v.to_bits()),
            Datum::Bytes(v) => codec::put_bytes_field(buf, 4, v),
            Datum::Text(v) => codec::put_str_field(buf, 5, v),
        }
    }

    fn decode(data: &[u8]) -> Result<Self, WireError> {
        let mut datum = Datum::Null;
        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    codec::expect_wire_type("bool", wire_type, WireType::Varint)?;
                    datum = Datum::Bool(reader.read_uvarint()? != 0);
                }
                2 => {
                    codec::expect_wire_type("int", wire_type, WireType::Varint)?;
                    datum = Datum::Int(reader.read_uvarint()? as i64);
                }
                3 => {
                    codec::expect_wire_type("float", wire_type, WireType::Fixed64)?;
                    datum = Datum::Float(f64::from_bits(reader.read_fixed64()?));
                }
                4 => {
                    codec::expect_wire_type("bytes", wire_type, WireType::LengthDelimited)?;
                    datum = Datum::Bytes(reader.read_len_prefixed()?.to_vec());
                }
                5 => {
                    codec::expect_wire_type("string", wire_type, WireType::LengthDelimited)?;
                    datum = Datum::Text(codec::read_string_field(&mut reader, "string")?);
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(datum)
    }
}
