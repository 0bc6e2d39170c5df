use std::io;

use thiserror::Error;

use crate::session::Phase;

pub type Result<T> = std::result::Result<T, SocksError>;

/// Per-connection failure. None of these outlive the session that raised them.
#[derive(Debug, Error)]
pub enum SocksError {
    #[error("unsupported SOCKS version: {found:#04x}")]
    ProtocolVersionMismatch { found: u8 },

    #[error("client does not offer no-authentication (offered {offered:02x?})")]
    UnsupportedAuthMethod { offered: Vec<u8> },

    #[error("unsupported command: {0:#04x}")]
    UnsupportedCommand(u8),

    #[error("unknown address type: {0:#04x}")]
    AddressDecodeFailure(u8),

    #[error("message truncated: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("{operation} is not valid in phase {phase:?}")]
    OutOfOrder {
        operation: &'static str,
        phase: Phase,
    },

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

impl SocksError {
    /// Protocol violations are the client's fault; transport errors are not.
    pub fn is_protocol_violation(&self) -> bool {
        !matches!(
            self,
            SocksError::Transport(_) | SocksError::ConnectionClosed | SocksError::OutOfOrder { .. }
        )
    }
}
