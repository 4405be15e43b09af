//! Wire codec error types.

use thiserror::Error;

/// Errors produced while encoding or decoding wire messages.
///
/// Any decode error aborts the whole message; there is no partial
/// recovery. Skipping an unrecognized field is the designed
/// forward-compatibility path, not an error. A [`WireError`] is a
/// protocol failure and must never be conflated with a server-side
/// error carried inside a successfully decoded response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The buffer ended in the middle of a field.
    #[error("truncated input: need {needed} more bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// A known field number arrived with a wire type the schema does
    /// not assign to it.
    #[error("field {field:?} has unexpected wire type {wire_type}")]
    WireTypeMismatch { field: &'static str, wire_type: u8 },

    /// A decoded length has its sign bit set when reinterpreted as a
    /// signed 64-bit value. Guards against corrupt or adversarial input.
    #[error("negative length: {0:#x}")]
    NegativeLength(u64),

    /// A tag carried a wire type outside the known set {0,1,2,3,4,5}.
    #[error("unknown wire type: {0}")]
    UnknownWireType(u8),

    /// A tag carried field number zero, which no schema assigns.
    #[error("illegal tag: field number is zero")]
    ZeroFieldNumber,

    /// A varint continuation chain ran past the ten-byte maximum.
    #[error("malformed varint: no terminator within 10 bytes")]
    InvalidVarint,

    /// A string field held bytes that are not valid UTF-8.
    #[error("invalid UTF-8 in field {field:?}")]
    InvalidUtf8 { field: &'static str },

    /// `encode_into` wrote a different byte count than `encoded_size`
    /// predicted. Always an implementation bug, never an input problem.
    #[error("encoded size mismatch: predicted {expected} bytes, wrote {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_error_display() {
        let err = WireError::Truncated {
            needed: 8,
            available: 3,
        };
        assert!(err.to_string().contains("8"));
        assert!(err.to_string().contains("3"));

        let err = WireError::WireTypeMismatch {
            field: "user",
            wire_type: 0,
        };
        assert!(err.to_string().contains("user"));

        // Lengths use hex format
        let err = WireError::NegativeLength(0x8000_0000_0000_0000);
        assert!(err.to_string().contains("0x8000000000000000"));

        let err = WireError::UnknownWireType(7);
        assert!(err.to_string().contains("7"));

        let err = WireError::ZeroFieldNumber;
        assert!(err.to_string().contains("zero"));

        let err = WireError::InvalidVarint;
        assert!(err.to_string().contains("varint"));

        let err = WireError::InvalidUtf8 { field: "sql" };
        assert!(err.to_string().contains("sql"));

        let err = WireError::SizeMismatch {
            expected: 10,
            actual: 12,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_wire_error_eq() {
        assert_eq!(
            WireError::Truncated {
                needed: 1,
                available: 0
            },
            WireError::Truncated {
                needed: 1,
                available: 0
            }
        );
        assert_ne!(WireError::InvalidVarint, WireError::ZeroFieldNumber);
    }
}
