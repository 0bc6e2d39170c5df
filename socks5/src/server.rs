use std::net::{Ipv4Addr, SocketAddr};

use log::{error, info, warn};
use tokio::net::{TcpListener, TcpStream};

use crate::config::Config;
use crate::error::Result;
use crate::session::Session;

pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind the listener. An unspecified IPv6 address falls back to
    /// `0.0.0.0` on hosts without IPv6.
    pub async fn bind(config: Config) -> Result<Self> {
        let addr = config.listen_addr;
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) if addr.is_ipv6() && addr.ip().is_unspecified() => {
                warn!("cannot listen on {}: {}, falling back to IPv4", addr, e);
                TcpListener::bind((Ipv4Addr::UNSPECIFIED, addr.port())).await?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per client.
    pub async fn run(self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((socket, addr)) => {
                    info!("new connection from {}", addr);
                    tokio::spawn(handle_connection(socket, addr));
                }
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(socket: TcpStream, addr: SocketAddr) {
    match Session::new(socket, addr).run().await {
        Ok(stats) => info!(
            "{}: request complete ({} bytes sent, {} bytes received)",
            addr, stats.upstream, stats.downstream
        ),
        Err(e) if e.is_protocol_violation() => warn!("{}: rejected: {}", addr, e),
        Err(e) => error!("{}: something went wrong during the request: {}", addr, e),
    }
}
