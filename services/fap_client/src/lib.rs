//! # FAP Management Protocol Client
//!
//! Registers a mobile user with a FAP controller, reports its GPS location
//! and deregisters it again.
//!
//! ## Architecture Role
//!
//! ```text
//! fap-types ──▶ fap-codec ──▶ fap-network ──▶ fap-client
//!                                 ▲               │
//!                            fap-config ──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fap_client::{ClientConfig, FapClient};
//! use fap_types::GpsFix;
//!
//! # async fn demo() -> Result<(), fap_client::ClientError> {
//! let client = FapClient::new(ClientConfig::default());
//! client.associate().await?;
//! client.report_location(GpsFix::now(41.178, -8.597, 0.0).ok()).await?;
//! client.disassociate().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{ClientState, FapClient};
pub use config::{AssociationPolicy, ClientConfig, Deadlines, OperationTimeouts};
pub use error::{ClientError, FailureKind};
