//! Connection management
//!
//! Connection identity and state, outbound handles, and the shared registry
//! of live connections.

pub mod outbound;
pub mod registry;
pub mod state;

pub use outbound::{ClientSender, Outbound};
pub use registry::ConnectionRegistry;
pub use state::{ConnectionId, ConnectionState};
