//! Per-connection session: join, relay loop, leave.
//!
//! The lifecycle is encoded in the types. A [`Session`] has not joined
//! yet; [`Session::join`] registers the connection, announces it and
//! yields a [`JoinedSession`]; [`JoinedSession::relay`] runs until the
//! transport closes or the registry evicts the connection, then
//! unregisters and announces the departure. Only a joined session can
//! announce a leave, so a connection whose handshake never completed
//! cannot produce a stray "left" notice.

use std::fmt;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};

use crate::domain::{ClientId, Connection, ConnectionId, ConnectionRegistry, OutboundMessage};

/// Result of reading one inbound frame from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A text frame.
    Data(String),
    /// The peer closed the connection.
    Closed,
    /// The transport failed.
    Error(String),
}

/// Why a joined session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Close frame received or inbound stream ended.
    Disconnected,
    /// The transport reported an error.
    TransportError(String),
    /// A broadcast could not reach this client and evicted it.
    Evicted,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::TransportError(e) => write!(f, "transport error: {e}"),
            Self::Evicted => f.write_str("evicted"),
        }
    }
}

/// What a finished session did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Client that owned the session.
    pub client_id: ClientId,
    /// Number of chat messages relayed.
    pub relayed: usize,
    /// How the session ended.
    pub reason: CloseReason,
}

/// A session whose connection is not registered yet.
#[derive(Debug)]
pub struct Session {
    registry: Arc<ConnectionRegistry>,
    connection: Connection,
}

impl Session {
    /// Binds `connection` to `registry` without registering it yet.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, connection: Connection) -> Self {
        Self {
            registry,
            connection,
        }
    }

    /// Registers the connection and broadcasts the join notice to every
    /// member, including the newcomer.
    pub async fn join(self) -> JoinedSession {
        let connection = Arc::new(self.connection);
        let client_id = connection.client_id();
        self.registry.register(Arc::clone(&connection)).await;
        tracing::info!(%client_id, connection = %connection.id(), "client joined");

        self.registry
            .broadcast(&OutboundMessage::joined(client_id))
            .await;

        JoinedSession {
            registry: self.registry,
            connection,
        }
    }
}

/// A registered session, ready to relay.
#[derive(Debug)]
pub struct JoinedSession {
    registry: Arc<ConnectionRegistry>,
    connection: Arc<Connection>,
}

impl JoinedSession {
    /// Registry key of this session's connection.
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection.id()
    }

    /// Relays every text frame from `inbound` to all members until the
    /// transport closes or the connection is evicted, then leaves.
    ///
    /// The sender receives its own chat messages back. A transport error
    /// ends the session the same way a clean close does. Frames already
    /// readable take priority over an eviction, so nothing the client sent
    /// is dropped once read.
    pub async fn relay<S>(self, mut inbound: S) -> SessionSummary
    where
        S: Stream<Item = ReadOutcome> + Unpin,
    {
        let client_id = self.connection.client_id().clone();
        let mut relayed = 0;

        let reason = loop {
            let outcome = tokio::select! {
                biased;
                outcome = inbound.next() => outcome,
                () = self.connection.evicted() => break CloseReason::Evicted,
            };

            match outcome {
                Some(ReadOutcome::Data(text)) => {
                    tracing::debug!(%client_id, len = text.len(), "relaying chat message");
                    self.registry
                        .broadcast(&OutboundMessage::chat(client_id.clone(), text))
                        .await;
                    relayed += 1;
                }
                Some(ReadOutcome::Closed) | None => break CloseReason::Disconnected,
                Some(ReadOutcome::Error(e)) => break CloseReason::TransportError(e),
            }
        };

        self.leave(client_id, relayed, reason).await
    }

    async fn leave(
        self,
        client_id: ClientId,
        relayed: usize,
        reason: CloseReason,
    ) -> SessionSummary {
        self.registry.unregister(self.connection.id()).await;
        tracing::info!(%client_id, relayed, %reason, "client left");

        self.registry
            .broadcast(&OutboundMessage::left(&client_id))
            .await;

        SessionSummary {
            client_id,
            relayed,
            reason,
        }
    }
}
