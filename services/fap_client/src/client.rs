//! Protocol Client
//!
//! Drives the three FAP operations over a single [`Session`]:
//!
//! ```text
//!          associate()                 disassociate()
//!  Idle ──▶ Associating ──▶ Associated ──▶ Disassociating ──▶ Idle
//!                              │  ▲
//!            report_location() ▼  │
//!                         ReportingLocation
//! ```
//!
//! Every operation follows the same template: resolve identity (cached),
//! build and encode the request, make sure a session is connected, send,
//! receive within the operation's deadline, decode, validate the echo. Any
//! failure from the connect step on closes the session and restores the
//! state the client had before the operation started.

use fap_codec::{decode_response, encode, Response};
use fap_network::{IdentityResolver, Session, TransportError};
use fap_types::{GpsFix, MsgType, ProtocolMessage, UserId};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{AssociationPolicy, ClientConfig, Deadlines};
use crate::error::ClientError;

/// Observable client state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Idle,
    Associating,
    Associated,
    ReportingLocation,
    Disassociating,
}

/// The three protocol operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Associate,
    Disassociate,
    ReportLocation,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Associate => "associate",
            Operation::Disassociate => "disassociate",
            Operation::ReportLocation => "report_location",
        }
    }

    fn request_type(self) -> MsgType {
        match self {
            Operation::Associate => MsgType::AssociationRequest,
            Operation::Disassociate => MsgType::DisassociationRequest,
            Operation::ReportLocation => MsgType::LocationUpdate,
        }
    }

    /// State shown while the request is outstanding. A report sent without
    /// an association leaves the state untouched.
    fn in_flight_state(self, prior: ClientState) -> ClientState {
        match self {
            Operation::Associate => ClientState::Associating,
            Operation::Disassociate => ClientState::Disassociating,
            Operation::ReportLocation if prior == ClientState::Associated => {
                ClientState::ReportingLocation
            }
            Operation::ReportLocation => prior,
        }
    }
}

/// State guarded for the whole duration of an operation
struct Exclusive {
    identity: Option<UserId>,
    session: Option<Session>,
}

/// FAP Management Protocol client
pub struct FapClient {
    config: ClientConfig,
    resolver: IdentityResolver,
    state: RwLock<ClientState>,
    exclusive: Mutex<Exclusive>,
}

impl FapClient {
    /// Client whose identity comes from the route toward the controller
    pub fn new(config: ClientConfig) -> Self {
        let resolver = IdentityResolver::route_probe(config.server);
        Self::with_resolver(config, resolver)
    }

    pub fn with_resolver(config: ClientConfig, resolver: IdentityResolver) -> Self {
        Self {
            config,
            resolver,
            state: RwLock::new(ClientState::Idle),
            exclusive: Mutex::new(Exclusive {
                identity: None,
                session: None,
            }),
        }
    }

    /// Current state, including transient in-flight states
    pub fn state(&self) -> ClientState {
        *self.state.read()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Register with the controller
    pub async fn associate(&self) -> Result<(), ClientError> {
        let mut exclusive = self.exclusive.lock().await;
        let deadlines = self.config.timeouts.association;

        self.run(&mut exclusive, Operation::Associate, None, deadlines)
            .await
            .map(|_| self.set_state(ClientState::Associated))
    }

    /// Deregister from the controller. Success closes the session.
    pub async fn disassociate(&self) -> Result<(), ClientError> {
        let mut exclusive = self.exclusive.lock().await;
        self.check_policy(Operation::Disassociate)?;
        let deadlines = self.config.timeouts.disassociation;

        self.run(&mut exclusive, Operation::Disassociate, None, deadlines)
            .await?;

        close_session(&mut exclusive).await;
        self.set_state(ClientState::Idle);
        Ok(())
    }

    /// Report one GPS fix.
    ///
    /// The controller must echo the fix's timestamp truncated to whole
    /// seconds. A missing fix is refused before any I/O. Only an associated
    /// client passes through `ReportingLocation`; under the permissive policy
    /// a report from `Idle` stays `Idle` throughout.
    pub async fn report_location(&self, fix: impl Into<Option<GpsFix>>) -> Result<(), ClientError> {
        let operation = Operation::ReportLocation;
        let Some(fix) = fix.into() else {
            warn!(op = operation.name(), "Location report without a GPS fix");
            return Err(ClientError::precondition(operation.name(), "no GPS fix supplied"));
        };

        let mut exclusive = self.exclusive.lock().await;
        self.check_policy(operation)?;
        let deadlines = self.config.timeouts.location;
        let prior = self.state();

        self.run(&mut exclusive, operation, Some(fix), deadlines)
            .await
            .map(|_| self.set_state(prior))
    }

    /// Close any open session and return to `Idle` without notifying the
    /// controller.
    ///
    /// A shutdown error is reported as a `SessionCloseWarning`; the client
    /// is idle either way.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        let mut exclusive = self.exclusive.lock().await;
        let result = match exclusive.session.take() {
            Some(mut session) => session.close().await.map_err(ClientError::from),
            None => Ok(()),
        };
        self.set_state(ClientState::Idle);
        info!("Client shut down");
        result
    }

    fn check_policy(&self, operation: Operation) -> Result<(), ClientError> {
        let state = self.state();
        if self.config.policy == AssociationPolicy::RequireAssociated
            && state != ClientState::Associated
        {
            warn!(op = operation.name(), ?state, "Operation requires an association");
            return Err(ClientError::precondition(
                operation.name(),
                format!("client is {state:?}, not Associated"),
            ));
        }
        Ok(())
    }

    /// Run one request/response exchange, restoring the prior state on failure
    async fn run(
        &self,
        exclusive: &mut Exclusive,
        operation: Operation,
        fix: Option<GpsFix>,
        deadlines: Deadlines,
    ) -> Result<Response, ClientError> {
        let prior = self.state();

        let user_id = match self.identity(exclusive) {
            Ok(user_id) => user_id,
            Err(e) => {
                close_session(exclusive).await;
                return Err(e);
            }
        };

        self.set_state(operation.in_flight_state(prior));
        let result = self
            .exchange(exclusive, operation, user_id, fix, deadlines)
            .await;

        match result {
            Ok(response) => {
                info!(op = operation.name(), %user_id, "Operation acknowledged");
                Ok(response)
            }
            Err(e) => {
                warn!(op = operation.name(), %user_id, error = %e, "Operation failed");
                close_session(exclusive).await;
                self.set_state(prior);
                Err(e)
            }
        }
    }

    async fn exchange(
        &self,
        exclusive: &mut Exclusive,
        operation: Operation,
        user_id: UserId,
        fix: Option<GpsFix>,
        deadlines: Deadlines,
    ) -> Result<Response, ClientError> {
        let request = match fix {
            Some(fix) => ProtocolMessage::location_update(user_id, fix),
            None => ProtocolMessage::new(user_id, operation.request_type(), None),
        };
        let frame = encode(&request).map_err(|source| ClientError::Encode {
            operation: operation.name(),
            source,
        })?;

        let session = self.connected_session(exclusive, deadlines).await?;
        session.send(&frame).await?;
        let reply = session.receive(deadlines.response).await?;
        debug!(op = operation.name(), bytes = reply.len(), "Response received");

        let response = decode_response(&reply).map_err(|source| ClientError::Decode {
            operation: operation.name(),
            source,
        })?;

        validate(operation, &request, &response)?;
        Ok(response)
    }

    /// Reuse the open session, or open a fresh one
    async fn connected_session<'a>(
        &self,
        exclusive: &'a mut Exclusive,
        deadlines: Deadlines,
    ) -> Result<&'a mut Session, ClientError> {
        let reusable = exclusive
            .session
            .as_ref()
            .map(Session::is_connected)
            .unwrap_or(false);

        if !reusable {
            let mut session = Session::with_config(self.config.server, self.config.session.clone());
            session.open(deadlines.connect).await?;
            exclusive.session = Some(session);
        }

        exclusive.session.as_mut().ok_or_else(|| {
            ClientError::from(TransportError::send_failure("Session not established"))
        })
    }

    fn identity(&self, exclusive: &mut Exclusive) -> Result<UserId, ClientError> {
        if let Some(user_id) = exclusive.identity {
            return Ok(user_id);
        }
        let user_id = self.resolver.resolve()?;
        exclusive.identity = Some(user_id);
        Ok(user_id)
    }

    fn set_state(&self, next: ClientState) {
        let mut state = self.state.write();
        let current = *state;
        if current != next {
            debug!(from = ?current, to = ?next, "Client state transition");
            *state = next;
        }
    }
}

impl std::fmt::Debug for FapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FapClient")
            .field("server", &self.config.server)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Check that `response` acknowledges `request`
fn validate(
    operation: Operation,
    request: &ProtocolMessage,
    response: &Response,
) -> Result<(), ClientError> {
    if response.user_id() != request.user_id {
        return Err(ClientError::mismatch(
            operation.name(),
            format!(
                "userId {} echoed, expected {}",
                response.user_id(),
                request.user_id
            ),
        ));
    }

    let expected = request.msg_type.expected_ack();
    if expected != Some(response.msg_type()) {
        return Err(ClientError::mismatch(
            operation.name(),
            format!(
                "received {}, expected {}",
                response.msg_type(),
                expected.map(|t| t.to_string()).unwrap_or_default()
            ),
        ));
    }

    if let Some(fix) = request.payload {
        let expected_ts = fix.normalized_timestamp();
        if response.gps_timestamp() != Some(expected_ts) {
            return Err(ClientError::mismatch(
                operation.name(),
                format!(
                    "gpsTimestamp {:?} echoed, expected {}",
                    response.gps_timestamp(),
                    fix.wire_timestamp()
                ),
            ));
        }
    }

    Ok(())
}

/// Close and drop the session, logging a shutdown error
async fn close_session(exclusive: &mut Exclusive) {
    if let Some(mut session) = exclusive.session.take() {
        if let Err(e) = session.close().await {
            warn!("Session close warning: {}", e);
        }
    }
}
