//! Protocol identifiers and the message envelope
//!
//! These are plain data types; their JSON encoding lives in `fap-codec`.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

use crate::gps::GpsFix;

/// Default controller port used by the FAP deployment
pub const DEFAULT_SERVER_PORT: u16 = 40123;

/// Numeric identity of a mobile user, derived from its local network address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(u32);

impl UserId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u8> for UserId {
    fn from(octet: u8) -> Self {
        Self(u32::from(octet))
    }
}

impl From<UserId> for u32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Protocol `msgType` values
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MsgType {
    AssociationRequest = 1,
    AssociationAccepted = 2,
    AssociationRejected = 3,
    DisassociationRequest = 4,
    DisassociationAck = 5,
    LocationUpdate = 6,
    LocationAck = 7,
}

impl MsgType {
    /// Wire code of this message type
    pub fn code(self) -> u8 {
        self.into()
    }

    /// Whether the client originates this message type
    pub fn is_request(self) -> bool {
        matches!(
            self,
            MsgType::AssociationRequest | MsgType::DisassociationRequest | MsgType::LocationUpdate
        )
    }

    /// Acknowledgment the controller must answer a request with
    pub fn expected_ack(self) -> Option<MsgType> {
        match self {
            MsgType::AssociationRequest => Some(MsgType::AssociationAccepted),
            MsgType::DisassociationRequest => Some(MsgType::DisassociationAck),
            MsgType::LocationUpdate => Some(MsgType::LocationAck),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MsgType::AssociationRequest => "AssociationRequest",
            MsgType::AssociationAccepted => "AssociationAccepted",
            MsgType::AssociationRejected => "AssociationRejected",
            MsgType::DisassociationRequest => "DisassociationRequest",
            MsgType::DisassociationAck => "DisassociationAck",
            MsgType::LocationUpdate => "LocationUpdate",
            MsgType::LocationAck => "LocationAck",
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

/// Protocol envelope: `{userId, msgType, gpsCoordinates?}`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtocolMessage {
    pub user_id: UserId,
    pub msg_type: MsgType,
    /// Present only for location updates
    pub payload: Option<GpsFix>,
}

impl ProtocolMessage {
    pub fn new(user_id: UserId, msg_type: MsgType, payload: Option<GpsFix>) -> Self {
        Self {
            user_id,
            msg_type,
            payload,
        }
    }

    pub fn association_request(user_id: UserId) -> Self {
        Self::new(user_id, MsgType::AssociationRequest, None)
    }

    pub fn disassociation_request(user_id: UserId) -> Self {
        Self::new(user_id, MsgType::DisassociationRequest, None)
    }

    /// Location update carrying the normalized form of `fix`
    pub fn location_update(user_id: UserId, fix: GpsFix) -> Self {
        Self::new(user_id, MsgType::LocationUpdate, Some(fix.normalized()))
    }
}
