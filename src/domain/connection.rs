//! One client's outbound channel.
//!
//! A [`Connection`] does not own the socket. It holds the sending half of a
//! bounded queue whose receiving half is drained by a writer task that owns
//! the socket sink. The queue serializes concurrent broadcasts to the same
//! peer, so frames are never interleaved.
//!
//! Each connection also carries an eviction token. The registry cancels it
//! when a send fails terminally; the writer task and the session both
//! watch it and shut the connection down.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::ClientId;
use super::message::Frame;

/// Source of process-unique connection ids.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Internal registry key for a connection.
///
/// Allocated in increasing order, so sorting by id yields insertion order.
/// Unlike [`ClientId`] it is unique: two browsers claiming the same client
/// id are still two connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Why a frame could not be handed to a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The writer task is gone; the peer disconnected or a socket write
    /// failed.
    #[error("connection closed")]
    Closed,

    /// The peer's queue stayed full for the whole send timeout.
    #[error("send timed out")]
    TimedOut,
}

/// A registered client connection, shared between its session and the
/// registry.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    client_id: ClientId,
    tx: mpsc::Sender<Frame>,
    evicted: CancellationToken,
}

impl Connection {
    /// Wraps an existing queue sender.
    #[must_use]
    pub fn new(client_id: ClientId, tx: mpsc::Sender<Frame>) -> Self {
        Self {
            id: ConnectionId::next(),
            client_id,
            tx,
            evicted: CancellationToken::new(),
        }
    }

    /// Creates a connection together with the receiving end of its queue.
    ///
    /// A `capacity` of zero is raised to one.
    #[must_use]
    pub fn channel(client_id: ClientId, capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(client_id, tx), rx)
    }

    /// Registry key of this connection.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// The identifier the client announced.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Marks the connection dead. Idempotent.
    pub fn evict(&self) {
        self.evicted.cancel();
    }

    /// Resolves once [`Connection::evict`] has been called.
    pub async fn evicted(&self) {
        self.evicted.cancelled().await;
    }

    /// A handle on the eviction signal for tasks that must not hold the
    /// connection itself, such as the writer task.
    #[must_use]
    pub fn eviction_token(&self) -> CancellationToken {
        self.evicted.clone()
    }

    /// Enqueues `frame` for the writer task, waiting at most `timeout` for
    /// queue space.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Closed`] if the writer task is gone and
    /// [`SendError::TimedOut`] if the queue stayed full.
    pub async fn send(&self, frame: Frame, timeout: Duration) -> Result<(), SendError> {
        match tokio::time::timeout(timeout, self.tx.send(frame)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(SendError::Closed),
            Err(_) => Err(SendError::TimedOut),
        }
    }
}
