//! Typed controller responses
//!
//! A response is decoded straight into one of these variants; nothing
//! downstream ever looks at raw JSON values.

use chrono::{DateTime, Utc};
use fap_types::{MsgType, UserId};

/// Controller response, validated at the codec boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    AssociationAccepted {
        user_id: UserId,
    },
    AssociationRejected {
        user_id: UserId,
    },
    DisassociationAck {
        user_id: UserId,
    },
    LocationAck {
        user_id: UserId,
        /// Second-precision timestamp the controller says it accepted
        gps_timestamp: DateTime<Utc>,
    },
    /// A request code echoed back; never a valid acknowledgment
    Echo {
        user_id: UserId,
        msg_type: MsgType,
    },
}

impl Response {
    pub fn user_id(&self) -> UserId {
        match *self {
            Response::AssociationAccepted { user_id }
            | Response::AssociationRejected { user_id }
            | Response::DisassociationAck { user_id }
            | Response::LocationAck { user_id, .. }
            | Response::Echo { user_id, .. } => user_id,
        }
    }

    pub fn msg_type(&self) -> MsgType {
        match *self {
            Response::AssociationAccepted { .. } => MsgType::AssociationAccepted,
            Response::AssociationRejected { .. } => MsgType::AssociationRejected,
            Response::DisassociationAck { .. } => MsgType::DisassociationAck,
            Response::LocationAck { .. } => MsgType::LocationAck,
            Response::Echo { msg_type, .. } => msg_type,
        }
    }

    /// Echoed GPS timestamp, present only on location acknowledgments
    pub fn gps_timestamp(&self) -> Option<DateTime<Utc>> {
        match *self {
            Response::LocationAck { gps_timestamp, .. } => Some(gps_timestamp),
            _ => None,
        }
    }
}
