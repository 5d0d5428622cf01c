//! # hive-relay
//!
//! WebSocket broadcast relay. Every text frame a client sends is fanned
//! out, tagged with the sender's id, to every connected client (the
//! sender included). The relay announces joins and departures with
//! system notices.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket /ws/{client_id})
//!     │
//!     ├── WS Handler + transport adapter (ws/)
//!     │
//!     ├── Session: join → relay → leave (service/)
//!     │
//!     └── ConnectionRegistry: register / unregister / broadcast (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
