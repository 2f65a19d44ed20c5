//! # FAP Client Configuration
//!
//! Layered settings for the FAP Management Protocol client:
//!
//! 1. Built-in defaults matching the reference deployment
//! 2. An optional TOML file
//! 3. `FAP_`-prefixed environment variables (`FAP_SERVER__PORT=40124`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fap_config::ClientSettings;
//!
//! let settings = ClientSettings::load(None).unwrap();
//! println!("controller at {}", settings.server.endpoint());
//! ```

pub mod client_settings;

pub use client_settings::{
    ClientSection, ClientSettings, LoggingSettings, ReportingSettings, ServerSettings,
    TimeoutSettings, ENV_PREFIX,
};
