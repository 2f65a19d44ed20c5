//! Client failure taxonomy
//!
//! Every public operation resolves to success or exactly one [`FailureKind`].

use fap_codec::CodecError;
use fap_network::{IdentityError, TransportError};
use thiserror::Error;

/// Discriminant of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    AddressUnavailable,
    ConnectTimeout,
    ConnectFailure,
    SendFailure,
    ReceiveTimeout,
    ReceiveFailure,
    DecodeFailure,
    ProtocolMismatch,
    PreconditionViolation,
    SessionCloseWarning,
}

/// Protocol client error type
#[derive(Error, Debug)]
pub enum ClientError {
    /// Local identity could not be derived
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Session lifecycle failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Controller endpoint could not be resolved to an address
    #[error("Cannot resolve controller endpoint {endpoint}: {source}")]
    Endpoint {
        endpoint: String,
        source: std::io::Error,
    },

    /// Request envelope could not be produced
    #[error("Failed to encode {operation} request: {source}")]
    Encode {
        operation: &'static str,
        source: CodecError,
    },

    /// Response bytes are not a valid protocol message
    #[error("Failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        source: CodecError,
    },

    /// Well-formed response that does not acknowledge the request
    #[error("Protocol mismatch during {operation}: {details}")]
    ProtocolMismatch {
        operation: &'static str,
        details: String,
    },

    /// Operation refused before any I/O
    #[error("Precondition violated for {operation}: {reason}")]
    PreconditionViolation {
        operation: &'static str,
        reason: String,
    },
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Identity(IdentityError::AddressUnavailable { .. }) => {
                FailureKind::AddressUnavailable
            }
            ClientError::Transport(e) => match e {
                TransportError::ConnectTimeout { .. } => FailureKind::ConnectTimeout,
                TransportError::ConnectFailure { .. } => FailureKind::ConnectFailure,
                TransportError::SendFailure { .. } => FailureKind::SendFailure,
                TransportError::ReceiveTimeout { .. } => FailureKind::ReceiveTimeout,
                TransportError::ReceiveFailure { .. } => FailureKind::ReceiveFailure,
                TransportError::CloseWarning { .. } => FailureKind::SessionCloseWarning,
            },
            ClientError::Endpoint { .. } => FailureKind::ConnectFailure,
            ClientError::Encode { .. } => FailureKind::SendFailure,
            ClientError::Decode { .. } => FailureKind::DecodeFailure,
            ClientError::ProtocolMismatch { .. } => FailureKind::ProtocolMismatch,
            ClientError::PreconditionViolation { .. } => FailureKind::PreconditionViolation,
        }
    }

    /// Whether the operation's primary outcome still stands
    pub fn is_warning(&self) -> bool {
        self.kind() == FailureKind::SessionCloseWarning
    }

    pub(crate) fn mismatch(operation: &'static str, details: impl Into<String>) -> Self {
        Self::ProtocolMismatch {
            operation,
            details: details.into(),
        }
    }

    pub(crate) fn precondition(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            operation,
            reason: reason.into(),
        }
    }
}
