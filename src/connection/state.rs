//! Module `state`
//!
//! Connection identifiers and the per-connection lifecycle states.

use std::fmt;

use uuid::Uuid;

/// Opaque, unique identifier of one connection.
///
/// Assigned when the connection is accepted and stable until it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generates a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a connection as seen by the relay.
///
/// ```text
/// Connecting --add--> Active --disconnect / failed delivery--> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepted by the transport, not yet registered
    Connecting,
    /// Registered; sends and receives relayed messages
    Active,
    /// Removed from the registry. Terminal.
    Closed,
}

impl ConnectionState {
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Active)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "CONNECTING"),
            ConnectionState::Active => write!(f, "ACTIVE"),
            ConnectionState::Closed => write!(f, "CLOSED"),
        }
    }
}
