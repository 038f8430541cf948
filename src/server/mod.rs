//! Server core functionality
//!
//! Binds the listening socket and hands every accepted connection to the
//! configured transport.

pub mod core;

pub use self::core::Server;
