//! FAP Network Layer
//!
//! Transport for the FAP Management Protocol:
//!
//! ```text
//! ┌──────────────┐   resolve()   ┌──────────────────┐
//! │ IdentityRes. │──────────────▶│ UserId (last oct)│
//! └──────────────┘               └──────────────────┘
//!
//! ┌──────────────┐  open/send/receive/close  ┌──────────────┐
//! │   Session    │◀─────────────────────────▶│  Controller  │
//! └──────────────┘   newline-framed JSON     └──────────────┘
//! ```
//!
//! ## What This Crate Does NOT Contain
//!
//! - Message encoding (see `fap-codec`)
//! - Association rules or client state (see `fap-client`)

pub mod error;
pub mod identity;
pub mod session;


pub use error::{IdentityError, Result, TransportError};
pub use identity::{user_id_from_ip, FixedAddress, IdentityResolver, LocalAddressSource, RouteProbe};
pub use session::{
    Session, SessionConfig, SessionState, SessionStats, DEFAULT_MAX_FRAME_SIZE, FRAME_DELIMITER,
};
