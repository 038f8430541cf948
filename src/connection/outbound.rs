//! Outbound handles
//!
//! The relay never touches sockets. It pushes payloads into an [`Outbound`]
//! handle owned by the transport, which drains it onto the wire.

use std::sync::Arc;

use tokio::sync::{Notify, mpsc};

use crate::error::DeliveryError;
use crate::relay::Payload;

/// Per-connection send capability handed to the relay by the transport.
///
/// `send` must not block: a broadcast calls it once per recipient in a loop,
/// and a stalled recipient must not hold up the others.
pub trait Outbound: Clone + Send + Sync + 'static {
    fn send(&self, payload: Payload) -> Result<(), DeliveryError>;

    /// Called once the relay has removed this connection. The transport must
    /// release the socket even if its writer is stuck on a peer that stopped
    /// reading.
    fn close(&self);
}

/// Sending half of a connection's bounded outbound queue
#[derive(Clone, Debug)]
pub struct ClientSender {
    tx: mpsc::Sender<Payload>,
    closed: Arc<Notify>,
}

impl ClientSender {
    /// Creates a queue of `capacity` payloads. The receiver goes to the
    /// connection's writer task.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Payload>) {
        let (tx, rx) = mpsc::channel(capacity);
        let sender = Self {
            tx,
            closed: Arc::new(Notify::new()),
        };
        (sender, rx)
    }

    /// Fires when the relay drops this connection. A close that happens
    /// before anyone waits is not lost.
    pub fn close_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.closed)
    }
}

impl Outbound for ClientSender {
    fn send(&self, payload: Payload) -> Result<(), DeliveryError> {
        self.tx.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    fn close(&self) {
        self.closed.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn full_queue_is_a_delivery_failure() {
        let (sender, mut rx) = ClientSender::channel(1);

        assert_eq!(sender.send(Payload::from("a")), Ok(()));
        assert_eq!(sender.send(Payload::from("b")), Err(DeliveryError::QueueFull));

        assert_eq!(rx.recv().await, Some(Payload::from("a")));
    }

    #[tokio::test]
    async fn dropped_receiver_is_closed() {
        let (sender, rx) = ClientSender::channel(4);
        drop(rx);

        assert_eq!(sender.send(Payload::from("a")), Err(DeliveryError::Closed));
    }

    #[tokio::test]
    async fn close_before_wait_still_wakes_transport() {
        let (sender, _rx) = ClientSender::channel(4);
        let signal = sender.close_signal();

        sender.clone().close();

        timeout(Duration::from_secs(1), signal.notified())
            .await
            .expect("close signal was lost");
    }
}
