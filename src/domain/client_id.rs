//! Caller-supplied client identifier.
//!
//! [`ClientId`] is taken verbatim from the WebSocket URL. It is used only
//! for display and as the `sender` field of chat messages; it is neither
//! validated nor required to be unique.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier a client chooses for itself.
///
/// Identifiers that parse as `i64` stay numeric so they serialize as JSON
/// numbers (`"sender": 2`); everything else serializes as a JSON string.
/// That includes all-digit ids outside the `i64` range: browsers cannot
/// represent such numbers exactly, so the digits are kept verbatim as
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientId {
    /// Integer identifier, the form browsers normally send.
    Numeric(i64),
    /// Any other path segment, kept as-is.
    Text(String),
}

impl ClientId {
    /// Classifies a raw path segment. Never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.parse::<i64>()
            .map_or_else(|_| Self::Text(raw.to_string()), Self::Numeric)
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}
