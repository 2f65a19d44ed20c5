//! TCP Session
//!
//! One exclusively owned connection to the controller with an explicit
//! lifecycle:
//!
//! ```text
//! Unconnected ──open──▶ Connected ──send──▶ AwaitingResponse
//!                           ▲                      │
//!                           └──────receive─────────┘
//!
//! any send/receive failure or close() ──▶ Closed
//! ```
//!
//! Frames are newline-delimited: one compact JSON object per line. The stream
//! has no resynchronization marker, so a session that failed mid-exchange is
//! never reused.

use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};

/// Frame terminator
pub const FRAME_DELIMITER: u8 = b'\n';

/// Default upper bound on a received frame
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Connected,
    AwaitingResponse,
    Closed,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum accepted frame length (bytes, excluding the delimiter)
    pub max_frame_size: usize,
    /// Disable Nagle so small request frames leave immediately
    pub nodelay: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            nodelay: true,
        }
    }
}

/// Connection statistics
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub peer_addr: SocketAddr,
    pub connected_duration: Duration,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Open TCP connection with reusable frame buffers
struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    connected_at: Instant,
    bytes_sent: u64,
    bytes_received: u64,
    read_buffer: BytesMut,
    /// Prefix of `read_buffer` already searched for a delimiter
    scanned: usize,
    /// Peer sent EOF; no further frames can arrive
    peer_closed: bool,
    write_buffer: BytesMut,
}

impl Connection {
    fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self {
            stream,
            peer_addr,
            connected_at: Instant::now(),
            bytes_sent: 0,
            bytes_received: 0,
            read_buffer: BytesMut::with_capacity(4 * 1024),
            scanned: 0,
            peer_closed: false,
            write_buffer: BytesMut::with_capacity(1024),
        }
    }

    /// Write `payload` followed by the frame delimiter in a single call
    async fn write_frame(&mut self, payload: &[u8]) -> std::io::Result<()> {
        self.write_buffer.clear();
        self.write_buffer.extend_from_slice(payload);
        self.write_buffer.extend_from_slice(&[FRAME_DELIMITER]);

        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;

        self.bytes_sent += self.write_buffer.len() as u64;
        debug!(
            peer = %self.peer_addr,
            bytes = payload.len(),
            total_sent = self.bytes_sent,
            "Sent frame"
        );
        Ok(())
    }

    /// Read one frame.
    ///
    /// A peer that hangs up after a partial line hands back what it sent; a
    /// peer that hangs up with nothing buffered is an error. Either way the
    /// connection is marked as closed by the peer.
    async fn read_frame(&mut self, max_size: usize) -> Result<Bytes> {
        loop {
            // Bytes before `scanned` are known to hold no delimiter
            let unscanned = &self.read_buffer[self.scanned..];
            if let Some(offset) = unscanned.iter().position(|&b| b == FRAME_DELIMITER) {
                let pos = self.scanned + offset;
                self.scanned = 0;
                if pos > max_size {
                    return Err(oversized(max_size, pos));
                }

                let mut frame = self.read_buffer.split_to(pos + 1);
                frame.truncate(pos);
                if !self.read_buffer.is_empty() {
                    debug!(
                        peer = %self.peer_addr,
                        pending = self.read_buffer.len(),
                        "Bytes buffered beyond frame"
                    );
                }
                return Ok(frame.freeze());
            }
            self.scanned = self.read_buffer.len();

            if self.read_buffer.len() > max_size {
                return Err(oversized(max_size, self.read_buffer.len()));
            }

            let read = self
                .stream
                .read_buf(&mut self.read_buffer)
                .await
                .map_err(|e| TransportError::receive_failure_with_source("Failed to read frame", e))?;
            self.bytes_received += read as u64;

            if read == 0 {
                self.peer_closed = true;
                self.scanned = 0;
                if self.read_buffer.is_empty() {
                    return Err(TransportError::receive_failure("Connection closed by peer"));
                }
                if self.read_buffer.len() > max_size {
                    return Err(oversized(max_size, self.read_buffer.len()));
                }
                debug!(
                    peer = %self.peer_addr,
                    bytes = self.read_buffer.len(),
                    "Peer closed after unterminated frame"
                );
                return Ok(self.read_buffer.split().freeze());
            }
        }
    }

    fn stats(&self) -> SessionStats {
        SessionStats {
            peer_addr: self.peer_addr,
            connected_duration: self.connected_at.elapsed(),
            bytes_sent: self.bytes_sent,
            bytes_received: self.bytes_received,
        }
    }
}

/// Single controller session
pub struct Session {
    remote: SocketAddr,
    config: SessionConfig,
    state: SessionState,
    connection: Option<Connection>,
}

impl Session {
    /// Create an unconnected session toward `remote`
    pub fn new(remote: SocketAddr) -> Self {
        Self::with_config(remote, SessionConfig::default())
    }

    pub fn with_config(remote: SocketAddr, config: SessionConfig) -> Self {
        Self {
            remote,
            config,
            state: SessionState::Unconnected,
            connection: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Whether a request can be sent right now
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Connection statistics while a connection is open
    pub fn stats(&self) -> Option<SessionStats> {
        self.connection.as_ref().map(Connection::stats)
    }

    /// Connect within `timeout`. On failure the session stays `Unconnected`.
    pub async fn open(&mut self, timeout: Duration) -> Result<()> {
        if self.state != SessionState::Unconnected {
            return Err(TransportError::connect_failure(
                format!("Session cannot be opened from state {:?}", self.state),
                self.remote,
            ));
        }

        debug!(remote = %self.remote, timeout_ms = timeout.as_millis() as u64, "Connecting to controller");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(self.remote))
            .await
            .map_err(|_| TransportError::connect_timeout(self.remote, timeout.as_millis() as u64))?
            .map_err(|e| {
                TransportError::connect_failure_with_source(
                    "Failed to connect to controller",
                    self.remote,
                    e,
                )
            })?;

        if self.config.nodelay {
            if let Err(e) = stream.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY: {}", e);
            }
        }

        let peer_addr = stream.peer_addr().unwrap_or(self.remote);
        self.connection = Some(Connection::new(stream, peer_addr));
        self.state = SessionState::Connected;

        info!(peer = %peer_addr, "Session connected");
        Ok(())
    }

    /// Send one frame; the session then awaits a response.
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        if self.state != SessionState::Connected {
            let state = self.state;
            self.abort();
            return Err(TransportError::send_failure(format!(
                "Session is not connected (state {state:?})"
            )));
        }
        if payload.contains(&FRAME_DELIMITER) {
            self.abort();
            return Err(TransportError::send_failure(
                "Payload contains the frame delimiter",
            ));
        }

        let result = match self.connection.as_mut() {
            Some(connection) => connection
                .write_frame(payload)
                .await
                .map_err(|e| TransportError::send_failure_with_source("Failed to write frame", e)),
            None => Err(TransportError::send_failure("Connection not established")),
        };

        match result {
            Ok(()) => {
                self.state = SessionState::AwaitingResponse;
                Ok(())
            }
            Err(e) => {
                self.abort();
                Err(e)
            }
        }
    }

    /// Wait up to `timeout` for the next frame.
    pub async fn receive(&mut self, timeout: Duration) -> Result<Bytes> {
        if !matches!(
            self.state,
            SessionState::Connected | SessionState::AwaitingResponse
        ) {
            let state = self.state;
            self.abort();
            return Err(TransportError::receive_failure(format!(
                "Session is not connected (state {state:?})"
            )));
        }

        let max_frame_size = self.config.max_frame_size;
        let result = match self.connection.as_mut() {
            Some(connection) => {
                match tokio::time::timeout(timeout, connection.read_frame(max_frame_size)).await {
                    Ok(frame) => frame,
                    Err(_) => Err(TransportError::receive_timeout(timeout.as_millis() as u64)),
                }
            }
            None => Err(TransportError::receive_failure("Connection not established")),
        };

        let peer_closed = self
            .connection
            .as_ref()
            .map(|connection| connection.peer_closed)
            .unwrap_or(true);

        match result {
            Ok(frame) if peer_closed => {
                // Last frame on this connection; nothing more can be exchanged
                self.abort();
                Ok(frame)
            }
            Ok(frame) => {
                self.state = SessionState::Connected;
                Ok(frame)
            }
            Err(e) => {
                self.abort();
                Err(e)
            }
        }
    }

    /// Close the session. Idempotent.
    ///
    /// A shutdown error does not keep the session open; it is handed back as
    /// [`TransportError::CloseWarning`].
    pub async fn close(&mut self) -> Result<()> {
        self.state = SessionState::Closed;

        let Some(mut connection) = self.connection.take() else {
            return Ok(());
        };

        let peer = connection.peer_addr;
        match connection.stream.shutdown().await {
            Ok(()) => {
                info!(peer = %peer, "Session closed");
                Ok(())
            }
            Err(e) => Err(TransportError::close_warning(
                format!("Error shutting down connection to {peer}"),
                e,
            )),
        }
    }

    /// Drop the connection without a graceful shutdown
    fn abort(&mut self) {
        if let Some(connection) = self.connection.take() {
            debug!(peer = %connection.peer_addr, "Session aborted");
        }
        self.state = SessionState::Closed;
    }
}

fn oversized(max_size: usize, len: usize) -> TransportError {
    TransportError::receive_failure(format!(
        "Frame of {len} bytes exceeds maximum size {max_size}"
    ))
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("remote", &self.remote)
            .field("state", &self.state)
            .finish()
    }
}
