//! Decoding of the `HEXADDR:HEXPORT` endpoints found in `/proc/net/{tcp,udp}`.
//!
//! The kernel prints the IPv4 address as the `%08X` rendering of a `u32` that
//! holds the address bytes in network order. On a little-endian host the hex
//! text therefore reads byte-reversed: `127.0.0.1` appears as `0100007F`.

use std::{fmt, net::Ipv4Addr};

/// Placeholder logged in place of an address that cannot be decoded.
pub const INVALID_ADDR: &str = "Invalid IP";

/// Decode a kernel hex address into dotted-quad form.
///
/// Returns [`INVALID_ADDR`] unless the input is exactly eight hex digits.
///
/// ```
/// # use monitor::codec::decode_addr;
/// assert_eq!(decode_addr("0100007F"), "127.0.0.1");
/// assert_eq!(decode_addr("zz00007F"), "Invalid IP");
/// ```
pub fn decode_addr(hex: &str) -> String {
    parse_addr(hex).map_or_else(|| INVALID_ADDR.to_string(), |addr| addr.to_string())
}

/// Decode a kernel hex address, `None` when malformed.
pub fn parse_addr(hex: &str) -> Option<Ipv4Addr> {
    if hex.len() != 8 || !is_hex(hex) {
        return None;
    }
    let raw = u32::from_str_radix(hex, 16).ok()?;
    Some(Ipv4Addr::from(raw.to_le_bytes()))
}

/// Encode an address the way a little-endian kernel prints it.
///
/// ```
/// # use monitor::codec::encode_addr;
/// # use std::net::Ipv4Addr;
/// assert_eq!(encode_addr(Ipv4Addr::LOCALHOST), "0100007F");
/// ```
pub fn encode_addr(addr: Ipv4Addr) -> String {
    format!("{:08X}", u32::from_le_bytes(addr.octets()))
}

/// Decode a kernel hex port (one to four hex digits).
pub fn decode_port(hex: &str) -> Option<u16> {
    if hex.is_empty() || hex.len() > 4 || !is_hex(hex) {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

#[inline]
fn is_hex(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A decoded local endpoint. `addr` is `None` when the kernel text could not
/// be decoded; it is displayed as [`INVALID_ADDR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub addr: Option<Ipv4Addr>,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr {
            Some(addr) => write!(f, "{addr}:{}", self.port),
            None => write!(f, "{INVALID_ADDR}:{}", self.port),
        }
    }
}

/// A socket table line that could not be turned into an [`Endpoint`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedLine {
    #[error("missing local address column")]
    MissingColumn,

    #[error("endpoint `{0}` is not ADDR:PORT")]
    NoSeparator(String),

    #[error("port `{0}` is not hexadecimal")]
    BadPort(String),
}

/// Parse a `HEXADDR:HEXPORT` field.
///
/// An unreadable address degrades to [`INVALID_ADDR`]; a missing separator or
/// unreadable port rejects the whole field.
pub fn parse_endpoint(field: &str) -> Result<Endpoint, MalformedLine> {
    let (addr, port) = field
        .split_once(':')
        .ok_or_else(|| MalformedLine::NoSeparator(field.to_string()))?;
    let port = decode_port(port).ok_or_else(|| MalformedLine::BadPort(port.to_string()))?;
    Ok(Endpoint {
        addr: parse_addr(addr),
        port,
    })
}
