//! Relay core
//!
//! Payloads, the fan-out engine, and the per-connection session state machine
//! that transports drive.

pub mod engine;
pub mod message;
pub mod session;

pub use engine::{BroadcastReport, RelayEngine};
pub use message::Payload;
pub use session::Session;
