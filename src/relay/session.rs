//! Per-connection session
//!
//! Each transport task owns one `Session` and drives it with the events its
//! socket produces: open, inbound message, close.

use std::sync::Arc;

use log::debug;

use crate::connection::{ClientSender, ConnectionId, ConnectionState, Outbound};
use crate::error::RegistryError;
use crate::relay::{BroadcastReport, Payload, RelayEngine};

/// State machine of one connection
pub struct Session<H: Outbound = ClientSender> {
    id: ConnectionId,
    state: ConnectionState,
    engine: Arc<RelayEngine<H>>,
}

impl<H: Outbound> Session<H> {
    /// Registers a new connection under a generated id and makes it active
    pub async fn open(engine: Arc<RelayEngine<H>>, handle: H) -> Result<Self, RegistryError> {
        Self::open_with_id(engine, ConnectionId::new(), handle).await
    }

    /// Registers a connection under `id`. On a duplicate id nothing is
    /// registered and the error is returned to the transport.
    pub async fn open_with_id(
        engine: Arc<RelayEngine<H>>,
        id: ConnectionId,
        handle: H,
    ) -> Result<Self, RegistryError> {
        let mut session = Self {
            id,
            state: ConnectionState::Connecting,
            engine,
        };
        session.engine.register(id, handle).await?;
        session.state = ConnectionState::Active;
        Ok(session)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Relays an inbound message to every other connection.
    ///
    /// A session removed by a failed delivery is closed here and relays
    /// nothing further.
    pub async fn relay(&mut self, payload: Payload) -> BroadcastReport {
        if !self.state.is_active() {
            return BroadcastReport::default();
        }

        if !self.engine.is_connected(&self.id).await {
            debug!("Connection {} was dropped by the relay", self.id);
            self.state = ConnectionState::Closed;
            return BroadcastReport::default();
        }

        self.engine.broadcast(&self.id, payload).await
    }

    /// Closes the session. Safe to call more than once.
    pub async fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }
        self.engine.disconnect(&self.id).await;
        self.state = ConnectionState::Closed;
    }
}
