//! # FAP Codec Integration Tests
//!
//! Verifies the public codec API the client relies on:
//! - Encode → decode preserves identity, message type and normalized GPS payload
//! - Responses decode into typed variants with lenient numeric literals
//! - Truncated or malformed input fails without producing partial values

use chrono::{DateTime, TimeZone, Utc};
use fap_codec::{
    decode_fields, decode_message, decode_response, encode, encode_response, CodecError, Response,
    FIELD_GPS_COORDINATES, FIELD_MSG_TYPE, FIELD_USER_ID,
};
use fap_types::{GpsFix, MsgType, ProtocolMessage, UserId};
use proptest::prelude::*;

fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_request_round_trip_exposes_user_and_type() {
    for msg_type in [MsgType::AssociationRequest, MsgType::DisassociationRequest] {
        let message = ProtocolMessage::new(UserId::new(23), msg_type, None);
        let fields = decode_fields(&encode(&message).unwrap()).unwrap();

        assert_eq!(fields[FIELD_USER_ID], 23);
        assert_eq!(fields[FIELD_MSG_TYPE], msg_type.code());
        assert!(!fields.contains_key(FIELD_GPS_COORDINATES));
    }
}

#[test]
fn test_location_update_round_trip() {
    let sent_at = new_year() + chrono::Duration::milliseconds(999);
    let fix = GpsFix::new(41.178, -8.597, 0.0, sent_at).unwrap();
    let message = ProtocolMessage::location_update(UserId::new(5), fix);

    let bytes = encode(&message).unwrap();
    let fields = decode_fields(&bytes).unwrap();
    let coordinates = fields[FIELD_GPS_COORDINATES].as_object().unwrap();
    assert_eq!(coordinates["timestamp"], "2024-01-01T00:00:00Z");

    let decoded = decode_message(&bytes).unwrap();
    assert_eq!(decoded.user_id, UserId::new(5));
    assert_eq!(decoded.msg_type, MsgType::LocationUpdate);
    let payload = decoded.payload.unwrap();
    assert_eq!(payload, fix.normalized());
    assert_eq!(payload.timestamp(), new_year());
}

#[test]
fn test_decode_typed_responses() {
    assert_eq!(
        decode_response(br#"{"userId": 4, "msgType": 2}"#).unwrap(),
        Response::AssociationAccepted { user_id: UserId::new(4) }
    );
    assert_eq!(
        decode_response(br#"{"userId": 4, "msgType": 3}"#).unwrap(),
        Response::AssociationRejected { user_id: UserId::new(4) }
    );
    assert_eq!(
        decode_response(br#"{"userId": 4, "msgType": 5}"#).unwrap(),
        Response::DisassociationAck { user_id: UserId::new(4) }
    );
    assert_eq!(
        decode_response(br#"{"userId":4,"msgType":7,"gpsTimestamp":"2024-01-01T00:00:00Z"}"#)
            .unwrap(),
        Response::LocationAck {
            user_id: UserId::new(4),
            gps_timestamp: new_year()
        }
    );
    assert_eq!(
        decode_response(br#"{"userId": 4, "msgType": 1}"#).unwrap(),
        Response::Echo {
            user_id: UserId::new(4),
            msg_type: MsgType::AssociationRequest
        }
    );
}

#[test]
fn test_decode_lenient_numeric_literals() {
    let response = decode_response(br#"{"userId": "12", "msgType": 2.0}"#).unwrap();
    assert_eq!(response.user_id(), UserId::new(12));
    assert_eq!(response.msg_type(), MsgType::AssociationAccepted);

    // Pretty-printed controllers are fine too
    let pretty = b"{\n  \"userId\" : 12.0,\n  \"msgType\" : \"5\"\n}";
    assert_eq!(
        decode_response(pretty).unwrap(),
        Response::DisassociationAck { user_id: UserId::new(12) }
    );
}

#[test]
fn test_decode_rejects_fractional_msg_type() {
    assert!(matches!(
        decode_response(br#"{"userId": 1, "msgType": 2.5}"#),
        Err(CodecError::InvalidNumber { field: FIELD_MSG_TYPE, .. })
    ));
}

#[test]
fn test_location_ack_requires_timestamp() {
    assert_eq!(
        decode_response(br#"{"userId": 1, "msgType": 7}"#).unwrap_err(),
        CodecError::MissingField { field: "gpsTimestamp" }
    );
    assert!(matches!(
        decode_response(br#"{"userId": 1, "msgType": 7, "gpsTimestamp": "yesterday"}"#),
        Err(CodecError::InvalidTimestamp { .. })
    ));
}

#[test]
fn test_decode_failures() {
    assert!(matches!(
        decode_response(br#"{"userId": 1, "msgType":"#),
        Err(CodecError::Truncated { .. })
    ));
    assert!(matches!(
        decode_response(b""),
        Err(CodecError::Truncated { .. })
    ));
    assert!(matches!(
        decode_response(b"not json"),
        Err(CodecError::Malformed { .. })
    ));
    assert_eq!(
        decode_response(br#"{"msgType": 2}"#).unwrap_err(),
        CodecError::MissingField { field: "userId" }
    );
    assert!(matches!(
        decode_message(br#"{"userId":1,"msgType":6}"#),
        Err(CodecError::MissingField { field: "gpsCoordinates" })
    ));
    assert!(matches!(
        decode_message(
            br#"{"userId":1,"msgType":6,"gpsCoordinates":{"lat":95.0,"lon":0,"alt":0,"timestamp":"2024-01-01T00:00:00Z"}}"#
        ),
        Err(CodecError::InvalidCoordinates(_))
    ));
}

#[test]
fn test_response_encoding_decodes_back() {
    let ack = Response::LocationAck {
        user_id: UserId::new(77),
        gps_timestamp: new_year(),
    };
    assert_eq!(decode_response(&encode_response(&ack).unwrap()).unwrap(), ack);
}

proptest! {
    #[test]
    fn prop_location_update_round_trip(
        user in 0u32..=255,
        lat in -90.0f64..=90.0,
        lon in -180.0f64..=180.0,
        alt in -500.0f64..10_000.0,
        secs in 0i64..4_102_444_800,
        nanos in 0u32..1_000_000_000,
    ) {
        let ts = DateTime::from_timestamp(secs, nanos).unwrap();
        let fix = GpsFix::new(lat, lon, alt, ts).unwrap();
        let message = ProtocolMessage::location_update(UserId::new(user), fix);

        let decoded = decode_message(&encode(&message).unwrap()).unwrap();
        let payload = decoded.payload.unwrap();

        prop_assert_eq!(decoded.user_id, UserId::new(user));
        prop_assert_eq!(decoded.msg_type, MsgType::LocationUpdate);
        prop_assert!((payload.latitude() - lat).abs() < 1e-9);
        prop_assert!((payload.longitude() - lon).abs() < 1e-9);
        prop_assert!((payload.altitude() - alt).abs() < 1e-9);
        prop_assert_eq!(payload.timestamp(), fix.normalized_timestamp());
    }
}
