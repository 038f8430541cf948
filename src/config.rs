//! Configuration management for RAX Relay Server
//!
//! Loaded once at startup from an optional `config.toml` with
//! `RAX_RELAY_*` environment overrides. Every key has a default, so the
//! server runs without any file present.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

const DEFAULT_CONFIG_NAME: &str = "config";
const ENV_PREFIX: &str = "RAX_RELAY";

/// Transport used to frame messages on accepted sockets
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// WebSocket upgrade; text and binary frames are relayed as-is
    #[default]
    WebSocket,
    /// Raw TCP with one message per `\n`-terminated line
    Tcp,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::WebSocket => write!(f, "websocket"),
            TransportKind::Tcp => write!(f, "tcp"),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind the listening socket
    pub bind_address: String,

    /// Listening port
    pub port: u16,

    /// Framing applied to every accepted connection
    pub transport: TransportKind,

    /// Maximum concurrent connections; extra sockets are refused
    pub max_clients: usize,

    /// Capacity of each connection's outbound queue. A peer whose queue is
    /// full when a broadcast reaches it is treated as dead.
    pub send_queue_size: usize,

    /// Largest inbound message accepted, in bytes
    pub max_message_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            transport: TransportKind::default(),
            max_clients: 1024,
            send_queue_size: 64,
            max_message_length: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load `config.toml` from the working directory (if any) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_NAME)
    }

    /// Load configuration from `path` (extension optional) with environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().to_string();

        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.send_queue_size == 0 {
            return Err(ConfigError::Message(
                "send_queue_size must be greater than 0".into(),
            ));
        }

        if self.max_message_length == 0 {
            return Err(ConfigError::Message(
                "max_message_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string.
    /// Port 0 asks the OS for an ephemeral port.
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
