//! # FAP Management Protocol Codec
//!
//! ## Purpose
//!
//! This crate is the "Rules" layer of the FAP client:
//! - Canonical JSON encoding of protocol requests
//! - Permissive decoding of any JSON object into a generic field mapping
//! - Typed [`Response`] decoding, validated at the codec boundary
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → network/ → services/fap_client
//!     ↑           ↓          ↓
//! Pure Data   JSON Rules   Sockets
//! GpsFix      encode()     Session
//! MsgType     decode_*()   Framing
//! ```
//!
//! ## Wire Shape
//!
//! ```json
//! {"userId":12,"msgType":6,"gpsCoordinates":{"lat":41.178,"lon":-8.597,"alt":0.0,"timestamp":"2024-01-01T00:00:00Z"}}
//! ```
//!
//! Encoded output is compact and never contains a newline, so the transport
//! can frame one object per line.
//!
//! ## What This Crate Does NOT Contain
//! - Socket management or framing (belongs in network/)
//! - Operation sequencing or echo validation (belongs in the client service)

pub mod builder;
pub mod constants;
pub mod error;
pub mod parser;
pub mod response;

pub use builder::{encode, encode_response};
pub use constants::*;
pub use error::{CodecError, CodecResult};
pub use parser::{decode_fields, decode_message, decode_response, FieldMap};
pub use response::Response;
