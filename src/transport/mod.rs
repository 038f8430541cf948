//! Transports
//!
//! Adapt accepted sockets to the relay: each connection gets a [`Session`],
//! a reader driving it with inbound messages, and a writer task draining the
//! connection's outbound queue onto the wire.
//!
//! [`Session`]: crate::relay::Session

pub mod tcp;
pub mod websocket;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpStream;

use crate::config::{ServerConfig, TransportKind};
use crate::relay::RelayEngine;

/// Runs one accepted connection to completion with the configured transport
pub async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    engine: Arc<RelayEngine>,
    config: Arc<ServerConfig>,
) {
    match config.transport {
        TransportKind::WebSocket => {
            websocket::handle_connection(stream, peer_addr, engine, config).await
        }
        TransportKind::Tcp => tcp::handle_connection(stream, peer_addr, engine, config).await,
    }
}
