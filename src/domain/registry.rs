//! Concurrent set of live connections with broadcast fan-out.
//!
//! [`ConnectionRegistry`] stores every registered [`Connection`] in a
//! `BTreeMap` keyed by [`ConnectionId`] behind a [`tokio::sync::RwLock`].
//!
//! # Concurrency
//!
//! - `register` / `unregister` take the write lock briefly.
//! - `broadcast` copies the membership under the read lock, releases it,
//!   and only then sends. Peers that fail a send are signalled through
//!   [`Connection::evict`] and removed under one short write lock
//!   afterwards.
//! - Sends to a single peer are serialized by that peer's queue.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::RwLock;

use super::connection::{Connection, ConnectionId};
use super::{ClientId, OutboundMessage};

/// Tunables for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Longest a broadcast waits for one peer's queue before evicting it.
    pub send_timeout: Duration,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of a single [`ConnectionRegistry::broadcast`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Peers whose queue accepted the frame.
    pub delivered: usize,
    /// Peers whose send failed and that were evicted from the registry.
    pub evicted: usize,
}

impl BroadcastReport {
    /// Number of delivery attempts, one per snapshot member.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.delivered + self.evicted
    }
}

/// Authoritative set of active connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<BTreeMap<ConnectionId, Arc<Connection>>>,
    settings: RegistrySettings,
}

impl ConnectionRegistry {
    /// Creates an empty registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(RegistrySettings::default())
    }

    /// Creates an empty registry with the given settings.
    #[must_use]
    pub fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            connections: RwLock::new(BTreeMap::new()),
            settings,
        }
    }

    /// Adds a connection as a target for all subsequent broadcasts.
    ///
    /// Returns `false` if the same connection was already registered, in
    /// which case the set is unchanged.
    pub async fn register(&self, connection: Arc<Connection>) -> bool {
        let mut map = self.connections.write().await;
        let id = connection.id();
        if map.contains_key(&id) {
            return false;
        }
        map.insert(id, connection);
        true
    }

    /// Removes a connection if present.
    ///
    /// Idempotent: removing an absent id is a no-op. Returns whether an
    /// entry was removed.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        self.connections.write().await.remove(&id).is_some()
    }

    /// Delivers `message` to every connection registered at the moment of
    /// the snapshot.
    ///
    /// Each peer is attempted once and independently. A peer whose send
    /// fails is removed from the registry; the broadcast still completes
    /// for everyone else. Serialization failure is logged and yields an
    /// empty report.
    pub async fn broadcast(&self, message: &OutboundMessage) -> BroadcastReport {
        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, kind = message.kind(), "dropping unencodable message");
                return BroadcastReport::default();
            }
        };

        let snapshot = self.snapshot().await;
        let timeout = self.settings.send_timeout;
        let sends = snapshot.iter().map(|conn| {
            let frame = Arc::clone(&frame);
            async move { (conn, conn.send(frame, timeout).await) }
        });

        let mut dead = Vec::new();
        for (conn, result) in join_all(sends).await {
            if let Err(e) = result {
                tracing::warn!(
                    connection = %conn.id(),
                    client_id = %conn.client_id(),
                    error = %e,
                    "evicting unreachable peer"
                );
                conn.evict();
                dead.push(conn.id());
            }
        }

        let evicted = dead.len();
        if !dead.is_empty() {
            let mut map = self.connections.write().await;
            for id in &dead {
                map.remove(id);
            }
        }

        tracing::debug!(
            kind = message.kind(),
            delivered = snapshot.len() - evicted,
            evicted,
            "broadcast complete"
        );

        BroadcastReport {
            delivered: snapshot.len() - evicted,
            evicted,
        }
    }

    /// Point-in-time copy of the membership, in insertion order.
    async fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections.read().await.values().map(Arc::clone).collect()
    }

    /// Returns `true` if the connection is currently registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Client ids of all registered connections, in insertion order.
    pub async fn client_ids(&self) -> Vec<ClientId> {
        self.connections
            .read()
            .await
            .values()
            .map(|conn| conn.client_id().clone())
            .collect()
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
