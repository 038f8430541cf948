//! Line-delimited TCP transport
//!
//! One message per `\n`-terminated line. A trailing `\r` is stripped, so
//! telnet-style clients work. Lines that are not UTF-8 are relayed as binary.

use bytes::Bytes;
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;

use crate::config::ServerConfig;
use crate::connection::ClientSender;
use crate::error::TransportError;
use crate::error::handlers::log_transport_error;
use crate::relay::{Payload, RelayEngine, Session};

/// Handles a TCP relay connection using the Tokio runtime.
///
/// - Registers the connection and spawns a writer for its outbound queue.
/// - Relays every inbound line to the other connections.
/// - Closes the session when the client hangs up, a read fails, or the relay
///   drops this connection after a failed delivery. In the last case the
///   socket is released even if the writer is blocked on a peer that stopped
///   reading.
pub async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    engine: Arc<RelayEngine>,
    config: Arc<ServerConfig>,
) {
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
    info!("Connection {} established from {} (tcp)", id, peer_addr);

    let (read_half, write_half) = stream.into_split();
    let mut writer = tokio::spawn(write_loop(write_half, outbound));

    let result = tokio::select! {
        result = read_loop(&mut session, read_half, config.max_message_length) => result,
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

async fn read_loop(
    session: &mut Session,
    read_half: OwnedReadHalf,
    max_message_length: usize,
) -> Result<(), TransportError> {
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();
    // Room for the message plus "\r\n"
    let limit = max_message_length as u64 + 2;

    loop {
        line.clear();
        let n = (&mut reader)
            .take(limit)
            .read_until(b'\n', &mut line)
            .await?;
        if n == 0 {
            // Client closed the connection
            return Ok(());
        }

        let message = strip_line_ending(&line);
        if message.len() > max_message_length {
            return Err(TransportError::MessageTooLong {
                length: message.len(),
                limit: max_message_length,
            });
        }

        session.relay(Payload::from_bytes(Bytes::copy_from_slice(message))).await;
        if session.state().is_closed() {
            return Ok(());
        }
    }
}

async fn write_loop(
    mut write_half: OwnedWriteHalf,
    mut outbound: mpsc::Receiver<Payload>,
) -> Result<(), TransportError> {
    while let Some(payload) = outbound.recv().await {
        write_half.write_all(payload.as_bytes()).await?;
        write_half.write_all(b"\n").await?;
    }

    // Queue closed: the relay dropped this connection
    write_half.shutdown().await?;
    Ok(())
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
