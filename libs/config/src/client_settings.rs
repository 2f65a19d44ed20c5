//! Client Settings Module
//!
//! Loads [`ClientSettings`] from defaults, an optional TOML file and the
//! environment, in that order of precedence (last wins).

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FAP";

/// Complete client settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClientSettings {
    pub server: ServerSettings,
    pub timeouts: TimeoutSettings,
    pub reporting: ReportingSettings,
    pub logging: LoggingSettings,
    pub client: ClientSection,
}

/// Controller endpoint
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    /// `host:port` string suitable for address lookup
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Per-operation deadlines, in seconds
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimeoutSettings {
    /// Connect deadline for every operation. When absent each operation
    /// connects within its own response deadline.
    pub connect_secs: Option<u64>,
    pub association_secs: u64,
    pub disassociation_secs: u64,
    pub location_secs: u64,
}

impl TimeoutSettings {
    pub fn association(&self) -> Duration {
        Duration::from_secs(self.association_secs)
    }

    pub fn disassociation(&self) -> Duration {
        Duration::from_secs(self.disassociation_secs)
    }

    pub fn location(&self) -> Duration {
        Duration::from_secs(self.location_secs)
    }

    /// Connect deadline for an operation whose response deadline is `response`
    pub fn connect_for(&self, response: Duration) -> Duration {
        self.connect_secs
            .map(Duration::from_secs)
            .unwrap_or(response)
    }
}

/// Location reporting cadence used by the harness
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ReportingSettings {
    pub period_secs: u64,
    pub reports: u32,
}

impl ReportingSettings {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

/// Client behaviour switches
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClientSection {
    /// Reject disassociation and location reports unless associated
    pub require_association: bool,
}

impl ClientSettings {
    /// Load settings with `FAP_` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load settings, reading environment overrides under `prefix`
    pub fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 40123)?
            .set_default("timeouts.association_secs", 2)?
            .set_default("timeouts.disassociation_secs", 2)?
            .set_default("timeouts.location_secs", 20)?
            .set_default("reporting.period_secs", 10)?
            .set_default("reporting.reports", 10)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("client.require_association", false)?;

        if let Some(path) = path {
            info!("Loading client config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        // FAP_SERVER__PORT → server.port
        builder = builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;
        let settings: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.validate()?;
        debug!(endpoint = %settings.server.endpoint(), "Client settings loaded");
        Ok(settings)
    }

    /// Reject values no client can run with
    pub fn validate(&self) -> Result<()> {
        let result = self.check();
        if let Err(e) = &result {
            warn!("Invalid client settings: {}", e);
        }
        result
    }

    fn check(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            bail!("server.host must not be empty");
        }
        if self.server.port == 0 {
            bail!("server.port must be non-zero");
        }
        if self.timeouts.connect_secs == Some(0) {
            bail!("timeouts.connect_secs must be non-zero");
        }
        for (name, secs) in [
            ("timeouts.association_secs", self.timeouts.association_secs),
            ("timeouts.disassociation_secs", self.timeouts.disassociation_secs),
            ("timeouts.location_secs", self.timeouts.location_secs),
        ] {
            if secs == 0 {
                bail!("{name} must be non-zero");
            }
        }
        Ok(())
    }
}
