//! IPv6 and ICMPv6 wire format parsing and building.
//!
//! The following formats are supported:
//! - The `IPv6` base header, including its extension header chain
//! - The `ICMPv6` messages used for echo probing: `EchoRequest`,
//!   `EchoReply`, `TimeExceeded` and `DestinationUnreachable`
//! - The `IPv6` upper-layer pseudo header checksum
//!
//! # Endianness
//!
//! All wire data is network byte order (big-endian) and all parsed values are
//! held in host byte order, converting as necessary for the given
//! architecture.
//!
//! # Example
//!
//! The following example builds an `ICMPv6` echo request and stamps its
//! checksum:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use std::net::Ipv6Addr;
//! use std::str::FromStr;
//! use trace6_packet::checksum::icmp_ipv6_checksum;
//! use trace6_packet::icmpv6::{self, IcmpMessage};
//!
//! let src = Ipv6Addr::from_str("2001:db8::1")?;
//! let dest = Ipv6Addr::from_str("2001:db8::2")?;
//! let echo = IcmpMessage::EchoRequest {
//!     identifier: 0x1234,
//!     sequence: 0x0001,
//! };
//! let mut buf = echo.marshal();
//! let checksum = icmp_ipv6_checksum(&buf, src, dest);
//! icmpv6::set_checksum(&mut buf, checksum);
//! assert_eq!(buf, hex_literal::hex!("80 00 12 13 12 34 00 01"));
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

/// Packet errors.
pub mod error;

/// Functions for calculating network checksums.
pub mod checksum;

/// `ICMPv6` messages.
pub mod icmpv6;

/// `IPv6` headers.
pub mod ipv6;

/// The IP packet next layer protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IpProtocol {
    HopByHop,
    Routing,
    DestinationOptions,
    IcmpV6,
    Other(u8),
}

impl IpProtocol {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::HopByHop => 0,
            Self::Routing => 43,
            Self::DestinationOptions => 60,
            Self::IcmpV6 => 58,
            Self::Other(id) => id,
        }
    }

    /// Is this protocol an `IPv6` extension header?
    #[must_use]
    pub const fn is_extension(self) -> bool {
        matches!(self, Self::HopByHop | Self::Routing | Self::DestinationOptions)
    }
}

impl From<u8> for IpProtocol {
    fn from(id: u8) -> Self {
        match id {
            0 => Self::HopByHop,
            43 => Self::Routing,
            60 => Self::DestinationOptions,
            58 => Self::IcmpV6,
            p => Self::Other(p),
        }
    }
}

/// Format a payload as a hexadecimal string.
#[must_use]
pub fn fmt_payload(bytes: &[u8]) -> String {
    use itertools::Itertools as _;
    format!("{:02x}", bytes.iter().format(" "))
}
