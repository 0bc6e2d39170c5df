//! Relay Engine: dial the target, answer the client, then pipe bytes both ways.

use std::io;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::address::TargetAddr;
use crate::error::Result;
use crate::protocol::{RELAY_BUFFER_SIZE, ReplyCode};
use crate::reply::Reply;
use crate::request::ConnectRequest;
use crate::wire;

/// Bytes moved by a finished relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Client to target.
    pub upstream: u64,
    /// Target to client.
    pub downstream: u64,
}

pub async fn connect_target(address: &TargetAddr, port: u16) -> io::Result<TcpStream> {
    match address {
        TargetAddr::Ipv4(ip) => TcpStream::connect((*ip, port)).await,
        TargetAddr::Ipv6(ip) => TcpStream::connect((*ip, port)).await,
        TargetAddr::Domain(host) => TcpStream::connect((host.as_str(), port)).await,
    }
}

/// Open the outbound connection and send the client its reply.
///
/// The reply is the request echoed back with REP set to SUCCEEDED, or to
/// GENERAL_FAILURE when the target cannot be reached. In the failure case the
/// client stream is closed and the connect error is returned.
pub async fn establish<S>(client: &mut S, request: &ConnectRequest) -> Result<TcpStream>
where
    S: AsyncWrite + Unpin,
{
    let reply = Reply::from_request(&request.raw);

    match connect_target(&request.address, request.port).await {
        Ok(target) => {
            let reply = reply.with_code(ReplyCode::Succeeded);
            client.write_all(reply.as_bytes()).await?;
            Ok(target)
        }
        Err(e) => {
            warn!(
                "failed to connect to {}:{}: {}",
                request.address, request.port, e
            );
            let reply = reply.with_code(ReplyCode::GeneralFailure);
            if let Err(write_err) = client.write_all(reply.as_bytes()).await {
                debug!("failure reply not delivered: {}", write_err);
            }
            wire::close(client).await;
            Err(e.into())
        }
    }
}

/// Pipe bytes between client and target until the client reaches EOF.
///
/// Client EOF ends the session: target writes are shut down, the client
/// stream is closed and both streams are dropped, whether or not the target
/// has finished. Target EOF only shuts down client writes; the client side
/// keeps flowing. A transport error in either direction fails the relay.
pub async fn relay<S>(client: S, target: TcpStream) -> Result<RelayStats>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut target_read, mut target_write) = target.into_split();
    let mut stats = RelayStats::default();

    {
        let upstream = pipe(&mut client_read, &mut target_write, &mut stats.upstream);
        let downstream = pipe(&mut target_read, &mut client_write, &mut stats.downstream);
        tokio::pin!(upstream, downstream);

        let mut target_done = false;
        loop {
            tokio::select! {
                res = &mut upstream => {
                    res?;
                    break;
                }
                res = &mut downstream, if !target_done => {
                    res?;
                    target_done = true;
                }
            }
        }
    }
    debug!("client stream ended after {} bytes", stats.upstream);

    wire::close(&mut client_write).await;
    Ok(stats)
}

async fn pipe<R, W>(reader: &mut R, writer: &mut W, total: &mut u64) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; RELAY_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        *total += n as u64;
    }
    wire::close(writer).await;
    Ok(())
}
