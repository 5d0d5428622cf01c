//! Service layer: per-connection session orchestration.

pub mod session;

pub use session::{CloseReason, JoinedSession, ReadOutcome, Session, SessionSummary};
