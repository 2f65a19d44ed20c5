//! Canonical request encoding
//!
//! Field order is fixed by the wire structs below: `userId`, `msgType`, then
//! `gpsCoordinates` (location updates only).

use fap_types::gps::format_wire_timestamp;
use fap_types::{GpsFix, MsgType, ProtocolMessage};
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::response::Response;

#[derive(Serialize)]
struct WireCoordinates {
    lat: f64,
    lon: f64,
    alt: f64,
    timestamp: String,
}

impl From<&GpsFix> for WireCoordinates {
    fn from(fix: &GpsFix) -> Self {
        Self {
            lat: fix.latitude(),
            lon: fix.longitude(),
            alt: fix.altitude(),
            timestamp: fix.wire_timestamp(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEnvelope {
    user_id: u32,
    msg_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    gps_coordinates: Option<WireCoordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gps_timestamp: Option<String>,
}

/// Encode a protocol message into its canonical single-line JSON form.
///
/// A `LocationUpdate` must carry a fix; any payload attached to other message
/// types is not transmitted.
pub fn encode(message: &ProtocolMessage) -> CodecResult<Vec<u8>> {
    let gps_coordinates = match (message.msg_type, message.payload.as_ref()) {
        (MsgType::LocationUpdate, Some(fix)) => Some(WireCoordinates::from(fix)),
        (MsgType::LocationUpdate, None) => {
            return Err(CodecError::MissingPayload {
                msg_type: message.msg_type.to_string(),
            })
        }
        _ => None,
    };

    to_bytes(&WireEnvelope {
        user_id: message.user_id.get(),
        msg_type: message.msg_type.code(),
        gps_coordinates,
        gps_timestamp: None,
    })
}

/// Encode a controller response.
///
/// The client never sends these; they exist for controller emulation in tests
/// and tooling.
pub fn encode_response(response: &Response) -> CodecResult<Vec<u8>> {
    to_bytes(&WireEnvelope {
        user_id: response.user_id().get(),
        msg_type: response.msg_type().code(),
        gps_coordinates: None,
        gps_timestamp: response
            .gps_timestamp()
            .map(|ts| format_wire_timestamp(&ts)),
    })
}

fn to_bytes(envelope: &WireEnvelope) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(envelope).map_err(|e| CodecError::Encode {
        details: e.to_string(),
    })
}
