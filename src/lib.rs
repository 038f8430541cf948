pub mod config;
pub mod connection;
pub mod error;
pub mod relay;
pub mod server;
pub mod transport;
pub mod utils;

pub use config::{ServerConfig, TransportKind};
pub use server::Server;
