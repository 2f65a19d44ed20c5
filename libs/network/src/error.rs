//! Transport Error Types
//!
//! Failure taxonomy for the session lifecycle and for local identity lookup.
//! Every variant maps one-to-one onto a failure kind surfaced by the client.

use std::net::SocketAddr;
use thiserror::Error;

/// Session transport error type
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection attempt exceeded its deadline
    #[error("Connect timeout: {remote} not reachable within {timeout_ms}ms")]
    ConnectTimeout { remote: SocketAddr, timeout_ms: u64 },

    /// Connection refused, unreachable, or attempted on a used session
    #[error("Connect failure: {message} (remote: {remote})")]
    ConnectFailure {
        message: String,
        remote: SocketAddr,
        source: Option<std::io::Error>,
    },

    /// Session not connected, or the write failed
    #[error("Send failure: {message}")]
    SendFailure {
        message: String,
        source: Option<std::io::Error>,
    },

    /// No complete frame arrived before the deadline
    #[error("Receive timeout: no response within {timeout_ms}ms")]
    ReceiveTimeout { timeout_ms: u64 },

    /// Read error, peer hang-up, oversized frame, or receive on a closed session
    #[error("Receive failure: {message}")]
    ReceiveFailure {
        message: String,
        source: Option<std::io::Error>,
    },

    /// Shutdown reported an error; the session is closed regardless
    #[error("Session close warning: {message}")]
    CloseWarning {
        message: String,
        source: std::io::Error,
    },
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    /// Create a connect timeout error
    pub fn connect_timeout(remote: SocketAddr, timeout_ms: u64) -> Self {
        Self::ConnectTimeout { remote, timeout_ms }
    }

    /// Create a connect failure
    pub fn connect_failure(message: impl Into<String>, remote: SocketAddr) -> Self {
        Self::ConnectFailure {
            message: message.into(),
            remote,
            source: None,
        }
    }

    /// Create a connect failure with source
    pub fn connect_failure_with_source(
        message: impl Into<String>,
        remote: SocketAddr,
        source: std::io::Error,
    ) -> Self {
        Self::ConnectFailure {
            message: message.into(),
            remote,
            source: Some(source),
        }
    }

    /// Create a send failure
    pub fn send_failure(message: impl Into<String>) -> Self {
        Self::SendFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Create a send failure with source
    pub fn send_failure_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::SendFailure {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a receive timeout error
    pub fn receive_timeout(timeout_ms: u64) -> Self {
        Self::ReceiveTimeout { timeout_ms }
    }

    /// Create a receive failure
    pub fn receive_failure(message: impl Into<String>) -> Self {
        Self::ReceiveFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Create a receive failure with source
    pub fn receive_failure_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::ReceiveFailure {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a close warning
    pub fn close_warning(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::CloseWarning {
            message: message.into(),
            source,
        }
    }

    /// Whether the error leaves the operation's primary outcome intact
    pub fn is_warning(&self) -> bool {
        matches!(self, TransportError::CloseWarning { .. })
    }
}

/// Local identity lookup failure
#[derive(Error, Debug)]
pub enum IdentityError {
    /// No usable local network address could be determined
    #[error("Local address unavailable: {reason}")]
    AddressUnavailable {
        reason: String,
        source: Option<std::io::Error>,
    },
}

impl IdentityError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::AddressUnavailable {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn unavailable_with_source(reason: impl Into<String>, source: std::io::Error) -> Self {
        Self::AddressUnavailable {
            reason: reason.into(),
            source: Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display_and_sources() {
        let remote: SocketAddr = "127.0.0.1:40123".parse().unwrap();

        let err = TransportError::connect_timeout(remote, 2000);
        assert_eq!(
            err.to_string(),
            "Connect timeout: 127.0.0.1:40123 not reachable within 2000ms"
        );
        assert!(err.source().is_none());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = TransportError::receive_failure_with_source("Failed to read frame", io);
        assert!(err.source().is_some());
        assert!(!err.is_warning());

        let io = std::io::Error::new(std::io::ErrorKind::NotConnected, "gone");
        assert!(TransportError::close_warning("shutdown failed", io).is_warning());
    }
}
