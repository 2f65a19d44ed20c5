//! Permissive JSON decoding with checked coercion
//!
//! Controllers are not consistent about numeric literals: `2`, `2.0` and `"2"`
//! all show up for the same `msgType`. Everything is funnelled through
//! [`coerce_integer`] so that only integral values survive; anything else is a
//! decode error rather than a silent truncation.

use chrono::{DateTime, Utc};
use fap_types::{GpsFix, MsgType, ProtocolMessage, UserId};
use serde_json::{Map, Value};
use tracing::trace;

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::response::Response;

/// Generic key → value view of a decoded JSON object
pub type FieldMap = Map<String, Value>;

/// Decode any well-formed JSON object into a field mapping
pub fn decode_fields(bytes: &[u8]) -> CodecResult<FieldMap> {
    let value: Value = serde_json::from_slice(bytes).map_err(CodecError::from_json)?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CodecError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

/// Decode a full protocol envelope, including the GPS payload of location updates
pub fn decode_message(bytes: &[u8]) -> CodecResult<ProtocolMessage> {
    let fields = decode_fields(bytes)?;
    let user_id = user_id_field(&fields)?;
    let msg_type = msg_type_field(&fields)?;

    let payload = if msg_type == MsgType::LocationUpdate {
        let coordinates = match fields.get(FIELD_GPS_COORDINATES) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(CodecError::Malformed {
                    details: format!(
                        "'{FIELD_GPS_COORDINATES}' must be an object, got {}",
                        json_kind(other)
                    ),
                })
            }
            None => {
                return Err(CodecError::MissingField {
                    field: FIELD_GPS_COORDINATES,
                })
            }
        };
        Some(gps_fix_field(coordinates)?)
    } else {
        None
    };

    Ok(ProtocolMessage::new(user_id, msg_type, payload))
}

/// Decode a controller response into its typed variant
pub fn decode_response(bytes: &[u8]) -> CodecResult<Response> {
    let fields = decode_fields(bytes)?;
    let user_id = user_id_field(&fields)?;
    let msg_type = msg_type_field(&fields)?;

    let response = match msg_type {
        MsgType::AssociationAccepted => Response::AssociationAccepted { user_id },
        MsgType::AssociationRejected => Response::AssociationRejected { user_id },
        MsgType::DisassociationAck => Response::DisassociationAck { user_id },
        MsgType::LocationAck => Response::LocationAck {
            user_id,
            gps_timestamp: timestamp_field(&fields, FIELD_GPS_TIMESTAMP)?,
        },
        request => Response::Echo {
            user_id,
            msg_type: request,
        },
    };

    Ok(response)
}

fn user_id_field(fields: &FieldMap) -> CodecResult<UserId> {
    let raw = coerce_integer(FIELD_USER_ID, required(fields, FIELD_USER_ID)?)?;
    u32::try_from(raw)
        .map(UserId::new)
        .map_err(|_| CodecError::InvalidNumber {
            field: FIELD_USER_ID,
            expected: "non-negative 32-bit integer",
            value: raw.to_string(),
        })
}

fn msg_type_field(fields: &FieldMap) -> CodecResult<MsgType> {
    let code = coerce_integer(FIELD_MSG_TYPE, required(fields, FIELD_MSG_TYPE)?)?;
    u8::try_from(code)
        .ok()
        .and_then(|c| MsgType::try_from(c).ok())
        .ok_or(CodecError::UnknownMsgType { code })
}

fn gps_fix_field(coordinates: &FieldMap) -> CodecResult<GpsFix> {
    let lat = coerce_float(FIELD_LAT, required(coordinates, FIELD_LAT)?)?;
    let lon = coerce_float(FIELD_LON, required(coordinates, FIELD_LON)?)?;
    let alt = coerce_float(FIELD_ALT, required(coordinates, FIELD_ALT)?)?;
    let timestamp = timestamp_field(coordinates, FIELD_TIMESTAMP)?;
    Ok(GpsFix::new(lat, lon, alt, timestamp)?)
}

fn timestamp_field(fields: &FieldMap, field: &'static str) -> CodecResult<DateTime<Utc>> {
    match required(fields, field)? {
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| CodecError::InvalidTimestamp {
                field,
                value: text.clone(),
            }),
        other => Err(CodecError::InvalidTimestamp {
            field,
            value: other.to_string(),
        }),
    }
}

fn required<'a>(fields: &'a FieldMap, field: &'static str) -> CodecResult<&'a Value> {
    fields.get(field).ok_or(CodecError::MissingField { field })
}

/// Coerce a JSON value to an integer.
///
/// Accepts integer literals, floats with no fractional part, and strings
/// holding either of those.
pub fn coerce_integer(field: &'static str, value: &Value) -> CodecResult<i64> {
    let invalid = || CodecError::InvalidNumber {
        field,
        expected: "integer",
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            trace!(field, literal = %n, "coercing non-integer numeric literal");
            n.as_f64().and_then(integral).ok_or_else(invalid)
        }
        Value::String(text) => {
            trace!(field, literal = %text, "coercing string literal");
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral))
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn coerce_float(field: &'static str, value: &Value) -> CodecResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| CodecError::InvalidNumber {
            field,
            expected: "number",
            value: value.to_string(),
        })
}

fn integral(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_integer_variants() {
        assert_eq!(coerce_integer("x", &json!(2)).unwrap(), 2);
        assert_eq!(coerce_integer("x", &json!(2.0)).unwrap(), 2);
        assert_eq!(coerce_integer("x", &json!("2")).unwrap(), 2);
        assert_eq!(coerce_integer("x", &json!(" 7.0 ")).unwrap(), 7);
        assert_eq!(coerce_integer("x", &json!(-3)).unwrap(), -3);
    }

    #[test]
    fn test_coerce_integer_rejects_non_integral() {
        for value in [json!(2.5), json!("abc"), json!(null), json!(true), json!([1]), json!(1e300)] {
            assert!(
                matches!(coerce_integer("x", &value), Err(CodecError::InvalidNumber { .. })),
                "{value} should not coerce"
            );
        }
    }

    #[test]
    fn test_decode_fields_rejects_non_objects() {
        assert_eq!(
            decode_fields(b"[1,2]").unwrap_err(),
            CodecError::NotAnObject { found: "array" }
        );
        assert!(matches!(
            decode_fields(br#"{"userId": 1, "msg"#),
            Err(CodecError::Truncated { .. })
        ));
        assert!(matches!(
            decode_fields(b"{userId: 1}"),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unknown_msg_type() {
        assert_eq!(
            decode_response(br#"{"userId":1,"msgType":9}"#).unwrap_err(),
            CodecError::UnknownMsgType { code: 9 }
        );
        assert_eq!(
            decode_response(br#"{"userId":1,"msgType":-1}"#).unwrap_err(),
            CodecError::UnknownMsgType { code: -1 }
        );
    }

    #[test]
    fn test_negative_user_id_is_invalid() {
        assert!(matches!(
            decode_response(br#"{"userId":-4,"msgType":2}"#),
            Err(CodecError::InvalidNumber { field: FIELD_USER_ID, .. })
        ));
    }
}
