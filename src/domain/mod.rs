//! Domain layer: client identity, outbound messages, connections, and the
//! connection registry.
//!
//! This module contains the relay's core: the shared registry of live
//! connections and the fan-out that delivers one immutable message to
//! every member.

pub mod client_id;
pub mod connection;
pub mod message;
pub mod registry;

pub use client_id::ClientId;
pub use connection::{Connection, ConnectionId, SendError};
pub use message::{Frame, OutboundMessage};
pub use registry::{BroadcastReport, ConnectionRegistry, RegistrySettings};
