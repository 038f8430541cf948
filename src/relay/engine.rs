use log::{debug, info, warn};

use crate::connection::{ClientSender, ConnectionId, ConnectionRegistry, Outbound};
use crate::error::RegistryError;
use crate::relay::Payload;

/// Outcome of one broadcast. Kept for logging and tests; the sender is
/// never told about failed recipients.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients whose outbound handle accepted the payload
    pub delivered: usize,
    /// Recipients whose delivery failed and which were removed
    pub dropped: Vec<ConnectionId>,
}

/// Relay engine.
///
/// - Owns the registry of live connections.
/// - Fans each inbound message out to every connection except its sender.
/// - Removes a recipient as soon as a delivery to it fails, without
///   interrupting delivery to the rest.
pub struct RelayEngine<H = ClientSender> {
    registry: ConnectionRegistry<H>,
}

impl<H: Outbound> RelayEngine<H> {
    pub fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry<H> {
        &self.registry
    }

    /// Registers a new connection under a freshly generated id
    pub async fn connect(&self, handle: H) -> Result<ConnectionId, RegistryError> {
        let id = ConnectionId::new();
        self.register(id, handle).await?;
        Ok(id)
    }

    /// Registers a connection under an id supplied by the transport
    pub async fn register(&self, id: ConnectionId, handle: H) -> Result<(), RegistryError> {
        self.registry.add(id, handle).await?;
        info!("User connected: {}", id);
        Ok(())
    }

    /// Delivers `payload` to every registered connection except `sender`.
    ///
    /// Works on a snapshot, so connections joining mid-broadcast miss this
    /// message and connections leaving mid-broadcast may still get it.
    pub async fn broadcast(&self, sender: &ConnectionId, payload: Payload) -> BroadcastReport {
        let recipients = self.registry.snapshot_excluding(sender).await;
        let mut report = BroadcastReport::default();

        for (id, handle) in recipients {
            match handle.send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Delivery to {} failed ({}), closing connection", id, e);
                    if let Some(removed) = self.registry.remove(&id).await {
                        removed.close();
                    }
                    report.dropped.push(id);
                }
            }
        }

        debug!(
            "Relayed {} bytes from {} to {} peer(s), {} dropped",
            payload.len(),
            sender,
            report.delivered,
            report.dropped.len()
        );

        report
    }

    /// Removes a connection. Returns `false` if it was already gone.
    pub async fn disconnect(&self, id: &ConnectionId) -> bool {
        match self.registry.remove(id).await {
            Some(handle) => {
                handle.close();
                info!("User disconnected: {}", id);
                true
            }
            None => false,
        }
    }

    pub async fn is_connected(&self, id: &ConnectionId) -> bool {
        self.registry.contains(id).await
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.len().await
    }
}

impl<H: Outbound> Default for RelayEngine<H> {
    fn default() -> Self {
        Self::new()
    }
}
