//! Address Decoder: turns the ATYP/DST.ADDR fields of a request into a target.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::{Result, SocksError};
use crate::protocol::{DOMAIN_NAME, IPV4_ADDRESS, IPV6_ADDRESS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddr {
    Ipv4(Ipv4Addr),
    Domain(String),
    Ipv6(Ipv6Addr),
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetAddr::Ipv4(ip) => write!(f, "{}", ip),
            TargetAddr::Domain(host) => f.write_str(host),
            // Byte pairs are concatenated without zero padding or separators,
            // so 0x0a01 renders as "a1". Kept for log compatibility only; the
            // connect path dials the typed address.
            TargetAddr::Ipv6(ip) => {
                for pair in ip.octets().chunks(2) {
                    write!(f, "{:x}{:x}", pair[0], pair[1])?;
                }
                Ok(())
            }
        }
    }
}

/// Result of decoding the address field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    pub addr: TargetAddr,
    /// Address bytes, excluding the domain length prefix.
    pub size: usize,
}

impl DecodedAddress {
    /// Bytes occupied by DST.ADDR on the wire, including any length prefix.
    pub fn encoded_len(&self) -> usize {
        match self.addr {
            TargetAddr::Domain(_) => self.size + 1,
            _ => self.size,
        }
    }
}

/// Decode the address whose ATYP byte sits at `offset` in `chunk`.
pub fn read_address(chunk: &[u8], offset: usize) -> Result<DecodedAddress> {
    let atyp = *chunk.get(offset).ok_or(SocksError::Truncated {
        needed: offset + 1,
        got: chunk.len(),
    })?;
    let start = offset + 1;

    match atyp {
        IPV4_ADDRESS => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(take(chunk, start, 4)?);
            Ok(DecodedAddress {
                addr: TargetAddr::Ipv4(Ipv4Addr::from(octets)),
                size: 4,
            })
        }
        DOMAIN_NAME => {
            let len = take(chunk, start, 1)?[0] as usize;
            let domain = take(chunk, start + 1, len)?;
            Ok(DecodedAddress {
                addr: TargetAddr::Domain(String::from_utf8_lossy(domain).into_owned()),
                size: len,
            })
        }
        IPV6_ADDRESS => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(take(chunk, start, 16)?);
            Ok(DecodedAddress {
                addr: TargetAddr::Ipv6(Ipv6Addr::from(octets)),
                size: 16,
            })
        }
        other => Err(SocksError::AddressDecodeFailure(other)),
    }
}

fn take(chunk: &[u8], start: usize, len: usize) -> Result<&[u8]> {
    chunk
        .get(start..start + len)
        .ok_or_else(|| truncated(start + len, chunk.len()))
}

fn truncated(needed: usize, got: usize) -> SocksError {
    SocksError::Truncated { needed, got }
}
