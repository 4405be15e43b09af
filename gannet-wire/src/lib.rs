//! # gannet-wire
//!
//! Binary wire format for the Gannet SQL client/server protocol.
//!
//! Every request and response travels as a compact tag-length-value
//! encoding built from protobuf-compatible primitives:
//! - Base-128 varints plus fixed64/fixed32 scalars
//! - Tagged fields (`field_number << 3 | wire_type`) emitted in
//!   ascending field-number order
//! - Length-delimited strings, byte blobs, and nested messages
//! - Unrecognized fields are skipped on decode, so newer peers can add
//!   fields without breaking older ones
//!
//! Framing is the transport's job: a buffer handed to
//! [`Message::decode`] must hold exactly one encoded message, and
//! [`Message::encode`] returns one contiguous buffer whose size is
//! computed up front by [`Message::encoded_size`].
//!
//! The codec is stateless and purely in-memory. Decoded messages own
//! all their data; input buffers are never retained or mutated.

pub mod codec;
pub mod datum;
pub mod error;
pub mod message;
pub mod wire;

pub use codec::Message;
pub use datum::Datum;
pub use error::WireError;
pub use message::{
    CommandId, Request, RequestHeader, Response, ResponseHeader, Row, ServerError,
    StatementResult,
};
pub use wire::{WireReader, WireType, MAX_VARINT_LEN};
