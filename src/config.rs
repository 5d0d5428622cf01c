//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::RegistrySettings;
use crate::error::RelayError;

/// Default bind address, same port the browser page historically used.
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8000`).
    pub listen_addr: SocketAddr,

    /// Capacity of each connection's outbound frame queue.
    pub outbound_queue_capacity: usize,

    /// Milliseconds a broadcast waits to enqueue a frame for one peer
    /// before treating that peer as dead.
    pub send_timeout_ms: u64,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `LISTEN_ADDR` cannot be parsed as
    /// a [`SocketAddr`] or if `OUTBOUND_QUEUE_CAPACITY` is zero.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();

        let raw_addr =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = raw_addr
            .parse()
            .map_err(|e| RelayError::Config(format!("LISTEN_ADDR {raw_addr:?}: {e}")))?;

        let config = Self {
            listen_addr,
            outbound_queue_capacity: parse_env("OUTBOUND_QUEUE_CAPACITY", 256),
            send_timeout_ms: parse_env("SEND_TIMEOUT_MS", 5_000),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that the environment parser cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if the queue capacity is zero.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.outbound_queue_capacity == 0 {
            return Err(RelayError::Config(
                "OUTBOUND_QUEUE_CAPACITY must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Registry settings derived from this configuration.
    #[must_use]
    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            send_timeout: Duration::from_millis(self.send_timeout_ms),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            outbound_queue_capacity: 256,
            send_timeout_ms: 5_000,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
