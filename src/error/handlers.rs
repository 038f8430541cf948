//! Error handlers
//!
//! Decides how loudly a per-connection failure gets logged.

use std::io::ErrorKind;

use log::{debug, warn};
use tokio_tungstenite::tungstenite;

use crate::connection::ConnectionId;
use crate::error::types::TransportError;

/// Whether the error is just the peer going away without a clean close
pub fn is_peer_disconnect(err: &TransportError) -> bool {
    match err {
        TransportError::Io(e) => is_disconnect_kind(e.kind()),
        TransportError::WebSocket(tungstenite::Error::ConnectionClosed)
        | TransportError::WebSocket(tungstenite::Error::AlreadyClosed)
        | TransportError::WebSocket(tungstenite::Error::Protocol(
            tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
        )) => true,
        TransportError::WebSocket(tungstenite::Error::Io(e)) => is_disconnect_kind(e.kind()),
        _ => false,
    }
}

fn is_disconnect_kind(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
    )
}

/// Log a transport error that ended a connection
pub fn log_transport_error(id: &ConnectionId, err: &TransportError) {
    if is_peer_disconnect(err) {
        debug!("Connection {} dropped by peer: {}", id, err);
    } else {
        warn!("Transport error on connection {}: {}", id, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn resets_count_as_disconnects() {
        let err = TransportError::Io(io::Error::from(ErrorKind::ConnectionReset));
        assert!(is_peer_disconnect(&err));

        let err = TransportError::WebSocket(tungstenite::Error::ConnectionClosed);
        assert!(is_peer_disconnect(&err));
    }

    #[test]
    fn oversize_message_is_a_real_fault() {
        let err = TransportError::MessageTooLong {
            length: 10,
            limit: 5,
        };
        assert!(!is_peer_disconnect(&err));

        let err = TransportError::Io(io::Error::from(ErrorKind::PermissionDenied));
        assert!(!is_peer_disconnect(&err));
    }
}
