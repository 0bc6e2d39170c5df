//! Handshake Negotiator: method selection, "no authentication" only.

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, SocksError};
use crate::protocol::{NO_AUTHENTICATION, SOCKS_VERSION};
use crate::wire;

/// `[VER][NMETHODS][METHODS...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    pub version: u8,
    pub methods: Vec<u8>,
}

impl HandshakeRequest {
    pub fn parse(chunk: &[u8]) -> Result<Self> {
        let (&version, rest) = chunk
            .split_first()
            .ok_or(SocksError::Truncated { needed: 1, got: 0 })?;
        if version != SOCKS_VERSION {
            return Err(SocksError::ProtocolVersionMismatch { found: version });
        }

        // A short method list is clamped to what arrived, not rejected.
        let (nmethods, rest) = match rest.split_first() {
            Some((&n, rest)) => (n as usize, rest),
            None => (0, rest),
        };
        let methods = &rest[..nmethods.min(rest.len())];

        Ok(Self {
            version,
            methods: methods.to_vec(),
        })
    }

    pub fn offers_no_auth(&self) -> bool {
        self.methods.contains(&NO_AUTHENTICATION)
    }
}

/// Run method selection on a freshly accepted stream.
///
/// On success exactly `[0x05, 0x00]` is written. On any failure the stream is
/// closed without a reply.
pub async fn negotiate<S>(stream: &mut S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let chunk = wire::read_chunk(stream).await?;

    let request = match HandshakeRequest::parse(&chunk) {
        Ok(request) => request,
        Err(e) => {
            wire::close(stream).await;
            return Err(e);
        }
    };
    debug!("client offered methods {:02x?}", request.methods);

    if !request.offers_no_auth() {
        wire::close(stream).await;
        return Err(SocksError::UnsupportedAuthMethod {
            offered: request.methods,
        });
    }

    stream
        .write_all(&[SOCKS_VERSION, NO_AUTHENTICATION])
        .await?;
    Ok(())
}
