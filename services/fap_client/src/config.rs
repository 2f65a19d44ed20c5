//! Client configuration
//!
//! [`ClientConfig`] is what a [`FapClient`](crate::FapClient) runs with. It is
//! usually derived from layered [`ClientSettings`], but tests build it
//! directly against a loopback controller.

use fap_config::ClientSettings;
use fap_network::SessionConfig;
use fap_types::protocol::DEFAULT_SERVER_PORT;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing::debug;

use crate::error::ClientError;

/// Connect and response deadlines for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub connect: Duration,
    pub response: Duration,
}

impl Deadlines {
    pub const fn new(connect: Duration, response: Duration) -> Self {
        Self { connect, response }
    }

    /// Same bound for connecting and for awaiting the response
    pub const fn uniform(timeout: Duration) -> Self {
        Self::new(timeout, timeout)
    }
}

/// Per-operation deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimeouts {
    pub association: Deadlines,
    pub disassociation: Deadlines,
    pub location: Deadlines,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            association: Deadlines::uniform(Duration::from_secs(2)),
            disassociation: Deadlines::uniform(Duration::from_secs(2)),
            // Twice the 10 s report period
            location: Deadlines::uniform(Duration::from_secs(20)),
        }
    }
}

/// Whether operations other than association require an association first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssociationPolicy {
    /// Disassociation and location reports are attempted from any state;
    /// the controller decides.
    #[default]
    Permissive,
    /// Disassociation and location reports are refused unless associated.
    RequireAssociated,
}

/// Protocol client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: SocketAddr,
    pub timeouts: OperationTimeouts,
    pub policy: AssociationPolicy,
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_SERVER_PORT)),
            timeouts: OperationTimeouts::default(),
            policy: AssociationPolicy::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            ..Self::default()
        }
    }

    pub fn with_timeouts(mut self, timeouts: OperationTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_policy(mut self, policy: AssociationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build from loaded settings, resolving the controller host
    pub async fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let endpoint = settings.server.endpoint();
        let server = tokio::net::lookup_host(endpoint.as_str())
            .await
            .and_then(|mut addrs| {
                addrs.next().ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses returned")
                })
            })
            .map_err(|source| ClientError::Endpoint {
                endpoint: endpoint.clone(),
                source,
            })?;
        debug!(%endpoint, %server, "Resolved controller endpoint");

        let t = &settings.timeouts;
        let timeouts = OperationTimeouts {
            association: Deadlines::new(t.connect_for(t.association()), t.association()),
            disassociation: Deadlines::new(t.connect_for(t.disassociation()), t.disassociation()),
            location: Deadlines::new(t.connect_for(t.location()), t.location()),
        };

        let policy = if settings.client.require_association {
            AssociationPolicy::RequireAssociated
        } else {
            AssociationPolicy::Permissive
        };

        Ok(Self::new(server).with_timeouts(timeouts).with_policy(policy))
    }
}
