//! A minimal SOCKS5 proxy: no-authentication negotiation and CONNECT relay.

pub mod address;
pub mod config;
pub mod error;
pub mod handshake;
pub mod protocol;
pub mod relay;
pub mod reply;
pub mod request;
pub mod server;
pub mod session;
mod wire;

pub use config::{Config, DEFAULT_PORT};
pub use error::{Result, SocksError};
pub use server::Server;
pub use session::{Phase, Session};
