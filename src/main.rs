//! RAX Relay Server - Entry Point
//!
//! Relays every message a client sends to all other connected clients.

use log::{error, info};
use std::process;

use rax_relay_server::utils::logging::init_logging;
use rax_relay_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    init_logging();

    info!("Launching relay server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            process::exit(1);
        }
    };

    server.start_with_shutdown(shutdown_signal()).await;
    info!("Relay server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
