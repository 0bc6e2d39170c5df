//! Request Parser: `[VER][CMD][RSV][ATYP][DST.ADDR][DST.PORT]`.

use bytes::Bytes;
use log::debug;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::address::{TargetAddr, read_address};
use crate::error::{Result, SocksError};
use crate::protocol::{
    ADDRESS_TYPE_OFFSET, CONNECT_COMMAND, ReplyCode, SOCKS_VERSION, command_name,
};
use crate::reply::Reply;
use crate::wire;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub version: u8,
    pub command: u8,
    pub address_type: u8,
    pub address: TargetAddr,
    pub port: u16,
    /// The request exactly as received; replies are built from it.
    pub raw: Bytes,
}

impl ConnectRequest {
    /// Parse a request chunk. Any command is accepted here; rejecting
    /// non-CONNECT commands is left to [`read_request`].
    pub fn parse(chunk: Bytes) -> Result<Self> {
        let version = *chunk
            .first()
            .ok_or(SocksError::Truncated { needed: 1, got: 0 })?;
        if version != SOCKS_VERSION {
            return Err(SocksError::ProtocolVersionMismatch { found: version });
        }

        let command = *chunk.get(1).ok_or(SocksError::Truncated {
            needed: 2,
            got: chunk.len(),
        })?;
        let decoded = read_address(&chunk, ADDRESS_TYPE_OFFSET)?;

        let port_offset = ADDRESS_TYPE_OFFSET + 1 + decoded.encoded_len();
        let port = chunk
            .get(port_offset..port_offset + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or(SocksError::Truncated {
                needed: port_offset + 2,
                got: chunk.len(),
            })?;

        Ok(Self {
            version,
            command,
            address_type: chunk[ADDRESS_TYPE_OFFSET],
            address: decoded.addr,
            port,
            raw: chunk,
        })
    }

    pub fn is_connect(&self) -> bool {
        self.command == CONNECT_COMMAND
    }
}

/// Read and validate the request that follows a successful handshake.
///
/// Malformed requests close the stream without a reply. Well-formed requests
/// for BIND or UDP ASSOCIATE get a COMMAND_NOT_SUPPORTED echo before closing.
pub async fn read_request<S>(stream: &mut S) -> Result<ConnectRequest>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let chunk = wire::read_chunk(stream).await?.freeze();

    let request = match ConnectRequest::parse(chunk) {
        Ok(request) => request,
        Err(e) => {
            wire::close(stream).await;
            return Err(e);
        }
    };
    debug!(
        "{} request for {}:{}",
        command_name(request.command),
        request.address,
        request.port
    );

    if !request.is_connect() {
        let reply = Reply::from_request(&request.raw).with_code(ReplyCode::CommandNotSupported);
        if let Err(e) = stream.write_all(reply.as_bytes()).await {
            debug!("command-not-supported reply not delivered: {}", e);
        }
        wire::close(stream).await;
        return Err(SocksError::UnsupportedCommand(request.command));
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BIND_COMMAND, UDP_ASSOCIATE_COMMAND};
    use std::net::{Ipv4Addr, Ipv6Addr};
    use tokio::io::AsyncReadExt;

    fn ipv4_request(cmd: u8) -> Vec<u8> {
        vec![0x05, cmd, 0x00, 0x01, 0x7f, 0x00, 0x00, 0x01, 0x00, 0x50]
    }

    #[test]
    fn parses_ipv4_connect() {
        let request = ConnectRequest::parse(Bytes::from(ipv4_request(CONNECT_COMMAND))).unwrap();
        assert!(request.is_connect());
        assert_eq!(request.address, TargetAddr::Ipv4(Ipv4Addr::LOCALHOST));
        assert_eq!(request.port, 80);
        assert_eq!(request.raw.len(), 10);
    }

    #[test]
    fn reads_port_after_domain() {
        let mut raw = vec![0x05, 0x01, 0x00, 0x03, 11];
        raw.extend_from_slice(b"example.com");
        raw.extend_from_slice(&[0x01, 0xbb]);

        let request = ConnectRequest::parse(Bytes::from(raw)).unwrap();
        assert_eq!(request.address.to_string(), "example.com");
        assert_eq!(request.port, 443);
    }

    #[test]
    fn parses_ipv6_connect() {
        let mut raw = vec![0x05, 0x01, 0x00, 0x04];
        raw.extend_from_slice(&Ipv6Addr::LOCALHOST.octets());
        raw.extend_from_slice(&[0x1f, 0x90]);

        let request = ConnectRequest::parse(Bytes::from(raw)).unwrap();
        assert_eq!(request.address_type, 0x04);
        assert_eq!(request.address, TargetAddr::Ipv6(Ipv6Addr::LOCALHOST));
        assert_eq!(request.port, 8080);
        assert_eq!(request.raw.len(), 22);
    }

    #[test]
    fn reads_high_ports_unsigned() {
        let mut raw = ipv4_request(CONNECT_COMMAND);
        raw[8] = 0xc3;
        raw[9] = 0x50;
        let request = ConnectRequest::parse(Bytes::from(raw)).unwrap();
        assert_eq!(request.port, 50000);
    }

    #[test]
    fn rejects_unknown_address_type() {
        let mut raw = ipv4_request(CONNECT_COMMAND);
        raw[3] = 0x05;
        assert!(matches!(
            ConnectRequest::parse(Bytes::from(raw)),
            Err(SocksError::AddressDecodeFailure(0x05))
        ));
    }

    #[test]
    fn rejects_missing_port() {
        let raw = ipv4_request(CONNECT_COMMAND)[..9].to_vec();
        assert!(matches!(
            ConnectRequest::parse(Bytes::from(raw)),
            Err(SocksError::Truncated { needed: 10, got: 9 })
        ));
    }

    #[tokio::test]
    async fn replies_command_not_supported() {
        for cmd in [BIND_COMMAND, UDP_ASSOCIATE_COMMAND] {
            let (mut client, mut server) = tokio::io::duplex(64);
            let raw = ipv4_request(cmd);
            client.write_all(&raw).await.unwrap();

            let err = read_request(&mut server).await.unwrap_err();
            assert!(matches!(err, SocksError::UnsupportedCommand(c) if c == cmd));

            let mut reply = Vec::new();
            client.read_to_end(&mut reply).await.unwrap();
            assert_eq!(reply.len(), raw.len());
            assert_eq!(reply[1], 0x07);
        }
    }

    #[tokio::test]
    async fn reports_unsupported_command_when_reply_cannot_be_sent() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&ipv4_request(BIND_COMMAND)).await.unwrap();
        drop(client);

        assert!(matches!(
            read_request(&mut server).await,
            Err(SocksError::UnsupportedCommand(0x02))
        ));
    }

    #[tokio::test]
    async fn closes_silently_on_wrong_version() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let mut raw = ipv4_request(CONNECT_COMMAND);
        raw[0] = 0x04;
        client.write_all(&raw).await.unwrap();

        assert!(matches!(
            read_request(&mut server).await,
            Err(SocksError::ProtocolVersionMismatch { found: 0x04 })
        ));

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert!(received.is_empty());
    }
}
