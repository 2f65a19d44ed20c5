//! Identity Resolver
//!
//! A user is identified by the last octet of the address its host uses to
//! reach the controller. The lookup touches no network: the route probe only
//! asks the OS which local address a UDP socket would use for the target.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use fap_types::UserId;
use tracing::debug;

use crate::error::IdentityError;

/// Source of the local network address
pub trait LocalAddressSource: Send + Sync {
    fn local_ip(&self) -> std::io::Result<IpAddr>;
}

/// Local address chosen by the OS to route toward `target`.
///
/// Connecting an unbound UDP socket sends no datagram; it only fixes the
/// route, after which `local_addr()` reports the outgoing interface address.
#[derive(Debug, Clone, Copy)]
pub struct RouteProbe {
    pub target: SocketAddr,
}

impl LocalAddressSource for RouteProbe {
    fn local_ip(&self) -> std::io::Result<IpAddr> {
        let bind_addr: SocketAddr = match self.target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(self.target)?;
        Ok(socket.local_addr()?.ip())
    }
}

/// Known local address
#[derive(Debug, Clone, Copy)]
pub struct FixedAddress(pub IpAddr);

impl LocalAddressSource for FixedAddress {
    fn local_ip(&self) -> std::io::Result<IpAddr> {
        Ok(self.0)
    }
}

/// Derives the client's [`UserId`] from its local address
pub struct IdentityResolver {
    source: Box<dyn LocalAddressSource>,
}

impl IdentityResolver {
    pub fn new(source: impl LocalAddressSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Resolver that probes the route toward the controller
    pub fn route_probe(target: SocketAddr) -> Self {
        Self::new(RouteProbe { target })
    }

    /// Resolver with a fixed local address
    pub fn fixed(ip: IpAddr) -> Self {
        Self::new(FixedAddress(ip))
    }

    /// Resolve the identity.
    ///
    /// Deterministic for a given local address; callers cache the result.
    pub fn resolve(&self) -> Result<UserId, IdentityError> {
        let ip = self
            .source
            .local_ip()
            .map_err(|e| IdentityError::unavailable_with_source("Local address lookup failed", e))?;

        let user_id = user_id_from_ip(ip).ok_or_else(|| {
            IdentityError::unavailable(format!("Address {ip} cannot identify a user"))
        })?;

        debug!(%ip, %user_id, "Resolved user identity");
        Ok(user_id)
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

/// Last octet of `ip`, or `None` for an unspecified address
pub fn user_id_from_ip(ip: IpAddr) -> Option<UserId> {
    if ip.is_unspecified() {
        return None;
    }
    let last = match ip {
        IpAddr::V4(v4) => v4.octets()[3],
        IpAddr::V6(v6) => v6.octets()[15],
    };
    Some(UserId::from(last))
}
