use anyhow::Result;
use clap::Parser;
use log::info;

use socks5::{Config, DEFAULT_PORT, Server};

#[derive(Parser)]
#[command(name = "socks5")]
#[command(about = "Minimal SOCKS5 proxy server (no authentication, CONNECT only)")]
struct Args {
    /// TCP port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let server = Server::bind(Config::with_port(args.port)).await?;
    info!("SOCKS5 proxy listening on {}", server.local_addr()?);

    server.run().await?;
    Ok(())
}
