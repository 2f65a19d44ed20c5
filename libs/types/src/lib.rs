//! # FAP Management Protocol Types
//!
//! Pure value types shared by every layer of the FAP Management Protocol client.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → codec → network → services/fap_client
//!     ↑
//! UserId, MsgType, GpsFix, ProtocolMessage
//! ```
//!
//! ## What This Crate Contains
//! - [`UserId`]: numeric client identity derived from the local address
//! - [`MsgType`]: the seven protocol message types and their wire codes
//! - [`GpsFix`]: a validated GPS sample with second-precision UTC timestamp
//! - [`ProtocolMessage`]: the request/response envelope
//!
//! ## What This Crate Does NOT Contain
//! - Wire encoding (belongs in `fap-codec`)
//! - Socket handling or identity lookup (belongs in `fap-network`)

pub mod errors;
pub mod gps;
pub mod protocol;

pub use errors::GpsError;
pub use gps::GpsFix;
pub use protocol::{MsgType, ProtocolMessage, UserId};
