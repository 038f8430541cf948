use log::{error, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::config::ServerConfig;
use crate::error::RelayServerError;
use crate::relay::RelayEngine;
use crate::transport::handle_connection;

pub struct Server {
    engine: Arc<RelayEngine>,
    listener: TcpListener,
    config: Arc<ServerConfig>,
    // One permit per live connection, taken at accept time
    slots: Arc<Semaphore>,
}

impl Server {
    /// Validates `config` and binds the listening socket
    pub async fn bind(config: ServerConfig) -> Result<Self, RelayServerError> {
        config.validate()?;
        let socket = config.listen_socket();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };
        info!("Server bound to {}", listener.local_addr()?);

        let slots = Arc::new(Semaphore::new(config.max_clients.min(Semaphore::MAX_PERMITS)));

        Ok(Self {
            engine: Arc::new(RelayEngine::new()),
            listener,
            config: Arc::new(config),
            slots,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn engine(&self) -> Arc<RelayEngine> {
        Arc::clone(&self.engine)
    }

    /// Accepts connections forever
    pub async fn start(self) {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves. Connections already
    /// running keep their own tasks.
    pub async fn start_with_shutdown(self, shutdown: impl Future<Output = ()>) {
        info!(
            "Starting relay server on {} ({} transport, max {} clients)",
            self.config.listen_socket(),
            self.config.transport,
            self.config.max_clients
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => match Arc::clone(&self.slots).try_acquire_owned() {
                        Ok(permit) => {
                            let engine = Arc::clone(&self.engine);
                            let config = Arc::clone(&self.config);

                            // Spawn a task for each connection so accept loop doesn't block
                            tokio::spawn(async move {
                                handle_connection(stream, addr, engine, config).await;
                                drop(permit);
                            });
                        }
                        Err(_) => {
                            warn!(
                                "Refusing {}: {} clients already connected",
                                addr, self.config.max_clients
                            );
                        }
                    },
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                },
            }
        }
    }
}
