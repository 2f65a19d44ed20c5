//! Codec errors for JSON envelope processing
//!
//! Every decode-side variant is reported to client callers as a decode
//! failure; the variants exist so logs say exactly which rule was broken.

use fap_types::GpsError;
use thiserror::Error;

/// Errors raised while encoding requests or decoding controller responses
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// Input ended before a complete JSON value was read
    #[error("Truncated message: {details}")]
    Truncated { details: String },

    /// Input is not well-formed JSON
    #[error("Malformed message: {details}")]
    Malformed { details: String },

    /// Top-level JSON value is not an object
    #[error("Message is not a JSON object (got {found})")]
    NotAnObject { found: &'static str },

    /// Required field absent
    #[error("Missing field '{field}'")]
    MissingField { field: &'static str },

    /// Field cannot be coerced to the expected numeric type
    #[error("Field '{field}' is not a valid {expected}: {value}")]
    InvalidNumber {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    /// `msgType` carries a code outside 1..7
    #[error("Unknown msgType code {code}")]
    UnknownMsgType { code: i64 },

    /// Timestamp field is not ISO-8601
    #[error("Field '{field}' is not an ISO-8601 timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    /// Coordinates decoded but violate GPS constraints
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(#[from] GpsError),

    /// Location update built without a fix
    #[error("{msg_type} requires a GPS payload")]
    MissingPayload { msg_type: String },

    /// Serializer failure
    #[error("Encoding failed: {details}")]
    Encode { details: String },
}

impl CodecError {
    /// Classify a `serde_json` parse error as truncation or malformed input
    pub(crate) fn from_json(err: serde_json::Error) -> Self {
        if err.is_eof() {
            Self::Truncated {
                details: err.to_string(),
            }
        } else {
            Self::Malformed {
                details: err.to_string(),
            }
        }
    }
}

/// Result type alias for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
