//! WebSocket transport
//!
//! Text frames are relayed as text and binary frames as binary. Ping/pong
//! and the closing handshake are answered by tungstenite. Messages and frames
//! larger than `max_message_length` are refused while reading, and the
//! connection is closed.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;

use crate::config::ServerConfig;
use crate::connection::ClientSender;
use crate::error::TransportError;
use crate::error::handlers::log_transport_error;
use crate::relay::{Payload, RelayEngine, Session};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsStream = SplitStream<WebSocketStream<TcpStream>>;

/// Performs the WebSocket handshake, then relays frames until either side
/// closes.
pub async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    engine: Arc<RelayEngine>,
    config: Arc<ServerConfig>,
) {
    let limits = WebSocketConfig::default()
        .max_message_size(Some(config.max_message_length))
        .max_frame_size(Some(config.max_message_length));

    let ws = match tokio_tungstenite::accept_async_with_config(stream, Some(limits)).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", peer_addr, e);
            return;
        }
    };

    let (sender, outbound) = ClientSender::channel(config.send_queue_size);
    let close_signal = sender.close_signal();
    let mut session = match Session::open(engine, sender).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Rejecting connection from {}: {}", peer_addr, e);
            return;
        }
    };
    let id = session.id();
    info!("Connection {} established from {} (websocket)", id, peer_addr);

    let (sink, stream) = ws.split();
    let mut writer = tokio::spawn(write_loop(sink, outbound));

    let result = tokio::select! {
        result = read_loop(&mut session, stream) => result,
        joined = &mut writer => match joined {
            Ok(result) => result,
            Err(e) => {
                warn!("Writer task for {} ended abnormally: {}", id, e);
                Ok(())
            }
        },
        _ = close_signal.notified() => {
            debug!("Connection {} dropped by the relay", id);
            Ok(())
        }
    };

    session.close().await;
    writer.abort();

    if let Err(e) = result {
        log_transport_error(&id, &e);
    }
    info!("Connection {} from {} closed", id, peer_addr);
}

async fn read_loop(session: &mut Session, mut stream: WsStream) -> Result<(), TransportError> {
    while let Some(message) = stream.next().await {
        let payload = match message? {
            Message::Text(text) => Payload::Text(text),
            Message::Binary(data) => Payload::Binary(data),
            Message::Close(_) => return Ok(()),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        };

        session.relay(payload).await;
        if session.state().is_closed() {
            return Ok(());
        }
    }

    Ok(())
}

async fn write_loop(
    mut sink: WsSink,
    mut outbound: mpsc::Receiver<Payload>,
) -> Result<(), TransportError> {
    while let Some(payload) = outbound.recv().await {
        let message = match payload {
            Payload::Text(text) => Message::Text(text),
            Payload::Binary(data) => Message::Binary(data),
        };
        sink.send(message).await?;
    }

    // Queue closed: the relay dropped this connection
    sink.close().await?;
    Ok(())
}
