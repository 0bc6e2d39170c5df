use std::net::{Ipv6Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 4378;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Listen on the unspecified IPv6 address at `port`, which also accepts
    /// IPv4 clients on dual-stack hosts.
    pub fn with_port(port: u16) -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_port(DEFAULT_PORT)
    }
}
