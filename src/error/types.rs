//! Error types
//!
//! Defines domain-specific error types for each part of the relay server.

use std::io;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::connection::ConnectionId;

/// Connection registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The transport handed out an id that is already live
    #[error("connection id already registered: {0}")]
    DuplicateId(ConnectionId),
}

/// Failure to push a payload into one recipient's outbound handle.
///
/// Recovered inside the broadcast loop; never reaches the sender.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("outbound queue is full")]
    QueueFull,

    #[error("outbound queue is closed")]
    Closed,
}

/// Accept/receive/send failures on a single connection.
///
/// Treated as an implicit disconnect of that connection only.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("message of {length} bytes exceeds limit of {limit} bytes")]
    MessageTooLong { length: usize, limit: usize },
}

/// Top-level error for server startup and teardown
#[derive(Debug, Error)]
pub enum RelayServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
