//! Protocol records exchanged between the SQL front end and the
//! execution backend.
//!
//! All field numbers are fixed. Encoders emit present fields in
//! ascending field-number order; decoders accept any order and skip
//! fields they do not recognize. Messages are value objects built fresh
//! per exchange; they own all their nested data.

use crate::codec::{self, Message};
use crate::datum::Datum;
use crate::error::WireError;
use crate::wire::{WireReader, WireType};
use bytes::BytesMut;

/// Identifier attached to a command for replay protection.
///
/// Both halves are always on the wire, zero or not, so an all-zero
/// identifier survives a round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandId {
    /// Wall-clock component, nanoseconds.
    pub wall_time: i64,
    /// Random disambiguation component.
    pub random: i64,
}

impl CommandId {
    pub fn new(wall_time: i64, random: i64) -> Self {
        Self { wall_time, random }
    }

    /// True when no replay protection was requested.
    pub fn is_empty(&self) -> bool {
        self.wall_time == 0 && self.random == 0
    }
}

impl Message for CommandId {
    fn encoded_size(&self) -> usize {
        codec::uvarint_field_len(1, self.wall_time as u64)
            + codec::uvarint_field_len(2, self.random as u64)
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        codec::put_uvarint_field(buf, 1, self.wall_time as u64);
        codec::put_uvarint_field(buf, 2, self.random as u64);
    }

    fn decode(data: &[u8]) -> Result<Self, WireError> {
        let mut msg = CommandId::default();
        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    codec::expect_wire_type("wall_time", wire_type, WireType::Varint)?;
                    msg.wall_time = reader.read_uvarint()? as i64;
                }
                2 => {
                    codec::expect_wire_type("random", wire_type, WireType::Varint)?;
                    msg.random = reader.read_uvarint()? as i64;
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

/// Server-side failure carried inside a [`ResponseHeader`].
///
/// Presence alone marks the request as failed. The payload here is the
/// minimal contract with the error-reporting component, which owns the
/// full schema and decodes the same bytes through this trait.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerError {
    /// Human-readable description.
    pub message: String,
    /// Whether the client may safely retry the request.
    pub retryable: bool,
}

impl ServerError {
    pub fn new(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            message: message.into(),
            retryable,
        }
    }
}

impl Message for ServerError {
    fn encoded_size(&self) -> usize {
        codec::bytes_field_len(1, self.message.len()) + codec::bool_field_len(2)
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        codec::put_str_field(buf, 1, &self.message);
        codec::put_bool_field(buf, 2, self.retryable);
    }

    fn decode(data: &[u8]) -> Result<Self, WireError> {
        let mut msg = ServerError::default();
        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    codec::expect_wire_type("message", wire_type, WireType::LengthDelimited)?;
                    msg.message = codec::read_string_field(&mut reader, "message")?;
                }
                2 => {
                    codec::expect_wire_type("retryable", wire_type, WireType::Varint)?;
                    msg.retryable = reader.read_uvarint()? != 0;
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

/// Client-supplied envelope at the front of every [`Request`].
///
/// `session` and `txn` are opaque to this layer: the client echoes back
/// whatever state the previous response carried, and only non-empty
/// blobs go on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestHeader {
    /// Opaque session state echoed from the previous response.
    pub session: Vec<u8>,
    /// Opaque transaction state echoed from the previous response.
    pub txn: Vec<u8>,
    /// Replay-protection identifier, always encoded.
    pub command_id: CommandId,
    /// Requesting user, always encoded.
    pub user: String,
}

impl Message for RequestHeader {
    fn encoded_size(&self) -> usize {
        let mut n = 0;
        if !self.session.is_empty() {
            n += codec::bytes_field_len(1, self.session.len());
        }
        if !self.txn.is_empty() {
            n += codec::bytes_field_len(2, self.txn.len());
        }
        n += codec::message_field_len(3, &self.command_id);
        n += codec::bytes_field_len(5, self.user.len());
        n
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        if !self.session.is_empty() {
            codec::put_bytes_field(buf, 1, &self.session);
        }
        if !self.txn.is_empty() {
            codec::put_bytes_field(buf, 2, &self.txn);
        }
        codec::put_message_field(buf, 3, &self.command_id);
        // Tag 4 is retired.
        codec::put_str_field(buf, 5, &self.user);
    }

    fn decode(data: &[u8]) -> Result<Self, WireError> {
        let mut msg = RequestHeader::default();
        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    codec::expect_wire_type("session", wire_type, WireType::LengthDelimited)?;
                    msg.session = reader.read_len_prefixed()?.to_vec();
                }
                2 => {
                    codec::expect_wire_type("txn", wire_type, WireType::LengthDelimited)?;
                    msg.txn = reader.read_len_prefixed()?.to_vec();
                }
                3 => {
                    codec::expect_wire_type("command_id", wire_type, WireType::LengthDelimited)?;
                    msg.command_id = CommandId::decode(reader.read_len_prefixed()?)?;
                }
                5 => {
                    codec::expect_wire_type("user", wire_type, WireType::LengthDelimited)?;
                    msg.user = codec::read_string_field(&mut reader, "user")?;
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

/// Server-supplied envelope at the front of every [`Response`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseHeader {
    /// Set when the request failed. Distinct from a [`WireError`]:
    /// a response carrying this still decoded cleanly.
    pub error: Option<ServerError>,
    /// Updated session state; absent means unchanged.
    pub session: Vec<u8>,
    /// Updated transaction state; absent means unchanged.
    pub txn: Vec<u8>,
}

impl ResponseHeader {
    /// True when the request succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl Message for ResponseHeader {
    fn encoded_size(&self) -> usize {
        let mut n = 0;
        if let Some(error) = &self.error {
            n += codec::message_field_len(1, error);
        }
        if !self.session.is_empty() {
            n += codec::bytes_field_len(2, self.session.len());
        }
        if !self.txn.is_empty() {
            n += codec::bytes_field_len(3, self.txn.len());
        }
        n
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        if let Some(error) = &self.error {
            codec::put_message_field(buf, 1, error);
        }
        if !self.session.is_empty() {
            codec::put_bytes_field(buf, 2, &self.session);
        }
        if !self.txn.is_empty() {
            codec::put_bytes_field(buf, 3, &self.txn);
        }
    }

    fn decode(data: &[u8]) -> Result<Self, WireError> {
        let mut msg = ResponseHeader::default();
        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    codec::expect_wire_type("error", wire_type, WireType::LengthDelimited)?;
                    msg.error = Some(ServerError::decode(reader.read_len_prefixed()?)?);
                }
                2 => {
                    codec::expect_wire_type("session", wire_type, WireType::LengthDelimited)?;
                    msg.session = reader.read_len_prefixed()?.to_vec();
                }
                3 => {
                    codec::expect_wire_type("txn", wire_type, WireType::LengthDelimited)?;
                    msg.txn = reader.read_len_prefixed()?.to_vec();
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

/// One row of a result set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Cell values, positionally matching the owning result's columns.
    pub values: Vec<Datum>,
}

impl Row {
    pub fn new(values: Vec<Datum>) -> Self {
        Self { values }
    }
}

impl Message for Row {
    fn encoded_size(&self) -> usize {
        self.values
            .iter()
            .map(|value| codec::message_field_len(1, value))
            .sum()
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        for value in &self.values {
            codec::put_message_field(buf, 1, value);
        }
    }

    fn decode(data: &[u8]) -> Result<Self, WireError> {
        let mut msg = Row::default();
        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    codec::expect_wire_type("values", wire_type, WireType::LengthDelimited)?;
                    msg.values.push(Datum::decode(reader.read_len_prefixed()?)?);
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

/// The result set produced by one executed statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementResult {
    /// Column names; order fixes the position of every cell below.
    pub columns: Vec<String>,
    /// Rows in result order. Each row is expected to carry one value
    /// per column; the codec moves whatever it is given and leaves that
    /// contract to the producer.
    pub rows: Vec<Row>,
}

impl Message for StatementResult {
    fn encoded_size(&self) -> usize {
        let mut n = 0;
        for column in &self.columns {
            n += codec::bytes_field_len(1, column.len());
        }
        for row in &self.rows {
            n += codec::message_field_len(2, row);
        }
        n
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        for column in &self.columns {
            codec::put_str_field(buf, 1, column);
        }
        for row in &self.rows {
            codec::put_message_field(buf, 2, row);
        }
    }

    fn decode(data: &[u8]) -> Result<Self, WireError> {
        let mut msg = StatementResult::default();
        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    codec::expect_wire_type("columns", wire_type, WireType::LengthDelimited)?;
                    msg.columns
                        .push(codec::read_string_field(&mut reader, "columns")?);
                }
                2 => {
                    codec::expect_wire_type("rows", wire_type, WireType::LengthDelimited)?;
                    msg.rows.push(Row::decode(reader.read_len_prefixed()?)?);
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

/// A unit of work sent to the backend: one or more SQL statements plus
/// bound parameter values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Request {
    pub header: RequestHeader,
    /// One or more `;`-separated statements.
    pub sql: String,
    /// Positional values for `?` placeholders, in placeholder order.
    pub params: Vec<Datum>,
}

impl Request {
    pub fn new(user: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            header: RequestHeader {
                user: user.into(),
                ..RequestHeader::default()
            },
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Datum>) -> Self {
        self.params = params;
        self
    }
}

impl Message for Request {
    fn encoded_size(&self) -> usize {
        let mut n = codec::message_field_len(1, &self.header);
        n += codec::bytes_field_len(2, self.sql.len());
        for param in &self.params {
            n += codec::message_field_len(3, param);
        }
        n
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        codec::put_message_field(buf, 1, &self.header);
        codec::put_str_field(buf, 2, &self.sql);
        for param in &self.params {
            codec::put_message_field(buf, 3, param);
        }
    }

    fn decode(data: &[u8]) -> Result<Self, WireError> {
        let mut msg = Request::default();
        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    codec::expect_wire_type("header", wire_type, WireType::LengthDelimited)?;
                    msg.header = RequestHeader::decode(reader.read_len_prefixed()?)?;
                }
                2 => {
                    codec::expect_wire_type("sql", wire_type, WireType::LengthDelimited)?;
                    msg.sql = codec::read_string_field(&mut reader, "sql")?;
                }
                3 => {
                    codec::expect_wire_type("params", wire_type, WireType::LengthDelimited)?;
                    msg.params.push(Datum::decode(reader.read_len_prefixed()?)?);
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}

/// Reply to a [`Request`]: one result set per executed statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    pub header: ResponseHeader,
    pub results: Vec<StatementResult>,
}

impl Response {
    pub fn ok(results: Vec<StatementResult>) -> Self {
        Self {
            header: ResponseHeader::default(),
            results,
        }
    }

    pub fn error(error: ServerError) -> Self {
        Self {
            header: ResponseHeader {
                error: Some(error),
                ..ResponseHeader::default()
            },
            results: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.header.is_ok()
    }
}

impl Message for Response {
    fn encoded_size(&self) -> usize {
        let mut n = codec::message_field_len(1, &self.header);
        for result in &self.results {
            n += codec::message_field_len(2, result);
        }
        n
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        codec::put_message_field(buf, 1, &self.header);
        for result in &self.results {
            codec::put_message_field(buf, 2, result);
        }
    }

    fn decode(data: &[u8]) -> Result<Self, WireError> {
        let mut msg = Response::default();
        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    codec::expect_wire_type("header", wire_type, WireType::LengthDelimited)?;
                    msg.header = ResponseHeader::decode(reader.read_len_prefixed()?)?;
                }
                2 => {
                    codec::expect_wire_type("results", wire_type, WireType::LengthDelimited)?;
                    msg.results
                        .push(StatementResult::decode(reader.read_len_prefixed()?)?);
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(msg)
    }
}
