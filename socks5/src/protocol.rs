//! SOCKS5 wire constants (RFC 1928).

pub const SOCKS_VERSION: u8 = 0x05;

// Authentication methods
pub const NO_AUTHENTICATION: u8 = 0x00;
pub const USERNAME_PASSWORD: u8 = 0x02;

pub const CONNECT_COMMAND: u8 = 0x01;
pub const BIND_COMMAND: u8 = 0x02;
pub const UDP_ASSOCIATE_COMMAND: u8 = 0x03;

pub const IPV4_ADDRESS: u8 = 0x01;
pub const DOMAIN_NAME: u8 = 0x03;
pub const IPV6_ADDRESS: u8 = 0x04;

/// Byte offset of the ATYP field in a request.
pub const ADDRESS_TYPE_OFFSET: usize = 3;

/// Byte offset of the REP field in a reply.
pub const REPLY_CODE_OFFSET: usize = 1;

/// Read buffer for a single handshake or request chunk.
pub const CHUNK_SIZE: usize = 1024;

pub const RELAY_BUFFER_SIZE: usize = 8192;

/// REP values emitted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    Succeeded = 0x00,
    GeneralFailure = 0x01,
    CommandNotSupported = 0x07,
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}

pub fn command_name(cmd: u8) -> &'static str {
    match cmd {
        CONNECT_COMMAND => "CONNECT",
        BIND_COMMAND => "BIND",
        UDP_ASSOCIATE_COMMAND => "UDP ASSOCIATE",
        _ => "UNKNOWN",
    }
}
