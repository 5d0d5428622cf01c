//! Outbound messages fanned out to every connection.
//!
//! The serialized shape is fixed by the browser client:
//!
//! ```json
//! {"type": "system", "content": "Client #2 joined"}
//! {"type": "chat", "sender": 2, "content": "hi"}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ClientId;
use crate::error::RelayError;

/// A message delivered to all registered connections.
///
/// Immutable once built. A broadcast serializes it once and hands the same
/// frame to every peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Server-generated notice; carries no sender.
    System {
        /// Human-readable notice text.
        content: String,
    },
    /// Text relayed on behalf of a client.
    Chat {
        /// Identifier of the originating client.
        sender: ClientId,
        /// The text exactly as the client sent it.
        content: String,
    },
}

impl OutboundMessage {
    /// Notice announcing that `client_id` joined.
    #[must_use]
    pub fn joined(client_id: &ClientId) -> Self {
        Self::System {
            content: format!("Client #{client_id} joined"),
        }
    }

    /// Notice announcing that `client_id` left.
    #[must_use]
    pub fn left(client_id: &ClientId) -> Self {
        Self::System {
            content: format!("Client #{client_id} left"),
        }
    }

    /// Chat message from `sender`.
    #[must_use]
    pub fn chat(sender: ClientId, content: impl Into<String>) -> Self {
        Self::Chat {
            sender,
            content: content.into(),
        }
    }

    /// Short label for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::Chat { .. } => "chat",
        }
    }

    /// Encodes the message as a shareable text frame.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serialize`] if JSON encoding fails.
    pub fn to_frame(&self) -> Result<Frame, RelayError> {
        Ok(Arc::from(serde_json::to_string(self)?))
    }
}

/// A serialized outbound message, shared across all peers of a broadcast.
pub type Frame = Arc<str>;
