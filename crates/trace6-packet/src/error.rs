use thiserror::Error;

/// A packet error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A packet error.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum Error {
    /// Attempting to parse a packet from an insufficient buffer.
    #[error("insufficient buffer for {0} packet, minimum={1}, provided={2}")]
    InsufficientPacketBuffer(String, usize, usize),
    /// Attempting to parse a packet which exceeds its fixed wire size.
    #[error("oversized buffer for {0} packet, maximum={1}, provided={2}")]
    OversizedPacketBuffer(String, usize, usize),
    /// The `IPv6` version nibble was not 6.
    #[error("invalid IPv6 version: {0}")]
    InvalidVersion(u8),
    /// The `IPv6` extension header chain did not fit the buffer.
    #[error("malformed IPv6 extension header chain at offset {0}")]
    MalformedExtensionChain(usize),
    /// The `ICMPv6` type is not one of the modelled message types.
    #[error("unknown ICMPv6 type: {0}")]
    UnknownIcmpType(u8),
    /// The `ICMPv6` code is outside the legal range for the type.
    #[error("invalid code {1} for ICMPv6 type {0}")]
    InvalidIcmpCode(u8, u8),
}
