use crate::error::{Error, Result};
use crate::fmt_payload;
use std::fmt::{self, Debug, Formatter};

const TYPE_OFFSET: usize = 0;
const CODE_OFFSET: usize = 1;
const IDENTIFIER_OFFSET: usize = 4;
const SEQUENCE_OFFSET: usize = 6;
const INVOKING_PACKET_OFFSET: usize = 8;

/// The offset of the checksum field within a serialized message.
pub const CHECKSUM_OFFSET: usize = 2;

/// The minimum size of an `ICMPv6` message.
///
/// The common header is 4 bytes and every modelled message carries a further
/// 4 bytes, either identifier and sequence or the unused error field.
pub const MIN_PACKET_SIZE: usize = 8;

/// The `ICMPv6` message types modelled by this crate.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IcmpType {
    DestinationUnreachable,
    TimeExceeded,
    EchoRequest,
    EchoReply,
}

impl IcmpType {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::DestinationUnreachable => 0x01,
            Self::TimeExceeded => 0x03,
            Self::EchoRequest => 0x80,
            Self::EchoReply => 0x81,
        }
    }
}

impl TryFrom<u8> for IcmpType {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            0x01 => Ok(Self::DestinationUnreachable),
            0x03 => Ok(Self::TimeExceeded),
            0x80 => Ok(Self::EchoRequest),
            0x81 => Ok(Self::EchoReply),
            id => Err(Error::UnknownIcmpType(id)),
        }
    }
}

/// The `ICMPv6` code.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct IcmpCode(pub u8);

/// An `ICMPv6` message.
///
/// A closed set, matching on it is exhaustive so adding a message type is a
/// compile time checked change for every consumer.
#[derive(Clone, Eq, PartialEq)]
pub enum IcmpMessage {
    /// An echo request probe.
    EchoRequest { identifier: u16, sequence: u16 },
    /// An echo reply from the probed target.
    EchoReply { identifier: u16, sequence: u16 },
    /// The hop limit expired at an intermediate node.
    ///
    /// Carries the raw bytes of the datagram which triggered the error.
    TimeExceeded { code: IcmpCode, invoking_packet: Vec<u8> },
    /// A node could not deliver the datagram.
    DestinationUnreachable { code: IcmpCode, invoking_packet: Vec<u8> },
}

impl IcmpMessage {
    /// Parse an `ICMPv6` message.
    ///
    /// The stored checksum is not validated here, callers verify it against
    /// the enclosing `IPv6` header separately.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < MIN_PACKET_SIZE {
            return Err(Error::InsufficientPacketBuffer(
                String::from("IcmpV6"),
                MIN_PACKET_SIZE,
                buf.len(),
            ));
        }
        let icmp_type = IcmpType::try_from(buf[TYPE_OFFSET])?;
        let code = check_code(icmp_type, IcmpCode(buf[CODE_OFFSET]))?;
        match icmp_type {
            IcmpType::EchoRequest => Ok(Self::EchoRequest {
                identifier: u16::from_be_bytes([buf[IDENTIFIER_OFFSET], buf[IDENTIFIER_OFFSET + 1]]),
                sequence: u16::from_be_bytes([buf[SEQUENCE_OFFSET], buf[SEQUENCE_OFFSET + 1]]),
            }),
            IcmpType::EchoReply => {
                if buf.len() > MIN_PACKET_SIZE {
                    return Err(Error::OversizedPacketBuffer(
                        String::from("EchoReply"),
                        MIN_PACKET_SIZE,
                        buf.len(),
                    ));
                }
                Ok(Self::EchoReply {
                    identifier: u16::from_be_bytes([
                        buf[IDENTIFIER_OFFSET],
                        buf[IDENTIFIER_OFFSET + 1],
                    ]),
                    sequence: u16::from_be_bytes([buf[SEQUENCE_OFFSET], buf[SEQUENCE_OFFSET + 1]]),
                })
            }
            IcmpType::TimeExceeded => Ok(Self::TimeExceeded {
                code,
                invoking_packet: buf[INVOKING_PACKET_OFFSET..].to_vec(),
            }),
            IcmpType::DestinationUnreachable => Ok(Self::DestinationUnreachable {
                code,
                invoking_packet: buf[INVOKING_PACKET_OFFSET..].to_vec(),
            }),
        }
    }

    /// Marshal the message.
    ///
    /// The checksum field is left as zero, stamp it with [`set_checksum`]
    /// once computed over the pseudo header.
    #[must_use]
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = vec![0_u8; MIN_PACKET_SIZE];
        buf[TYPE_OFFSET] = self.icmp_type().id();
        buf[CODE_OFFSET] = self.code().0;
        match self {
            Self::EchoRequest { identifier, sequence }
            | Self::EchoReply { identifier, sequence } => {
                buf[IDENTIFIER_OFFSET..SEQUENCE_OFFSET].copy_from_slice(&identifier.to_be_bytes());
                buf[SEQUENCE_OFFSET..MIN_PACKET_SIZE].copy_from_slice(&sequence.to_be_bytes());
            }
            Self::TimeExceeded { invoking_packet, .. }
            | Self::DestinationUnreachable { invoking_packet, .. } => {
                buf.extend_from_slice(invoking_packet);
            }
        }
        buf
    }

    /// The wire type of this message.
    #[must_use]
    pub const fn icmp_type(&self) -> IcmpType {
        match self {
            Self::EchoRequest { .. } => IcmpType::EchoRequest,
            Self::EchoReply { .. } => IcmpType::EchoReply,
            Self::TimeExceeded { .. } => IcmpType::TimeExceeded,
            Self::DestinationUnreachable { .. } => IcmpType::DestinationUnreachable,
        }
    }

    /// The wire code of this message.
    #[must_use]
    pub const fn code(&self) -> IcmpCode {
        match self {
            Self::EchoRequest { .. } | Self::EchoReply { .. } => IcmpCode(0),
            Self::TimeExceeded { code, .. } | Self::DestinationUnreachable { code, .. } => *code,
        }
    }
}

impl Debug for IcmpMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::EchoRequest { identifier, sequence } => f
                .debug_struct("EchoRequest")
                .field("identifier", identifier)
                .field("sequence", sequence)
                .finish(),
            Self::EchoReply { identifier, sequence } => f
                .debug_struct("EchoReply")
                .field("identifier", identifier)
                .field("sequence", sequence)
                .finish(),
            Self::TimeExceeded { code, invoking_packet } => f
                .debug_struct("TimeExceeded")
                .field("code", code)
                .field("invoking_packet", &fmt_payload(invoking_packet))
                .finish(),
            Self::DestinationUnreachable { code, invoking_packet } => f
                .debug_struct("DestinationUnreachable")
                .field("code", code)
                .field("invoking_packet", &fmt_payload(invoking_packet))
                .finish(),
        }
    }
}

/// Write `checksum` into the checksum field of a serialized message.
pub fn set_checksum(buf: &mut [u8], checksum: u16) {
    buf[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_be_bytes());
}

/// The legal code range depends on the message type.
///
/// Echo requests are unconstrained, the remaining types enforce the ranges
/// of their defined codes.
fn check_code(icmp_type: IcmpType, code: IcmpCode) -> Result<IcmpCode> {
    let max = match icmp_type {
        IcmpType::EchoRequest => return Ok(code),
        IcmpType::EchoReply => 0,
        IcmpType::TimeExceeded => 1,
        IcmpType::DestinationUnreachable => 6,
    };
    if code.0 > max {
        Err(Error::InvalidIcmpCode(icmp_type.id(), code.0))
    } else {
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use test_case::test_case;

    #[test]
    fn test_parse_echo_request() {
        let buf = hex!("80 00 16 7c 60 9b 82 9a");
        let message = IcmpMessage::parse(&buf).unwrap();
        assert_eq!(
            IcmpMessage::EchoRequest {
                identifier: 0x609b,
                sequence: 0x829a,
            },
            message
        );
        assert_eq!(IcmpType::EchoRequest, message.icmp_type());
        assert_eq!(IcmpCode(0), message.code());
    }

    #[test]
    fn test_parse_echo_reply() {
        let buf = hex!("81 00 ff 54 12 34 00 01");
        let message = IcmpMessage::parse(&buf).unwrap();
        assert_eq!(
            IcmpMessage::EchoReply {
                identifier: 0x1234,
                sequence: 0x0001,
            },
            message
        );
    }

    #[test]
    fn test_parse_oversized_echo_reply() {
        let buf = hex!("81 00 ff 54 12 34 00 01 de ad");
        let err = IcmpMessage::parse(&buf).unwrap_err();
        assert_eq!(
            Error::OversizedPacketBuffer(String::from("EchoReply"), MIN_PACKET_SIZE, 10),
            err
        );
    }

    #[test]
    fn test_parse_time_exceeded() {
        let buf = hex!("03 00 ab cd 00 00 00 00 60 00 00 00 de ad be ef");
        let message = IcmpMessage::parse(&buf).unwrap();
        assert_eq!(
            IcmpMessage::TimeExceeded {
                code: IcmpCode(0),
                invoking_packet: hex!("60 00 00 00 de ad be ef").to_vec(),
            },
            message
        );
    }

    #[test]
    fn test_parse_destination_unreachable() {
        let buf = hex!("01 04 ab cd 00 00 00 00 60 00 00 00");
        let message = IcmpMessage::parse(&buf).unwrap();
        assert_eq!(
            IcmpMessage::DestinationUnreachable {
                code: IcmpCode(4),
                invoking_packet: hex!("60 00 00 00").to_vec(),
            },
            message
        );
        assert_eq!(IcmpCode(4), message.code());
    }

    #[test]
    fn test_parse_too_short() {
        for len in 0..MIN_PACKET_SIZE {
            let buf = vec![0x80_u8; len];
            let err = IcmpMessage::parse(&buf).unwrap_err();
            assert_eq!(
                Error::InsufficientPacketBuffer(String::from("IcmpV6"), MIN_PACKET_SIZE, len),
                err
            );
        }
    }

    #[test_case(0x00; "reserved")]
    #[test_case(0x02; "packet too big")]
    #[test_case(0x04; "parameter problem")]
    #[test_case(0x88; "neighbour advertisement")]
    fn test_parse_unknown_type(icmp_type: u8) {
        let buf = [icmp_type, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let err = IcmpMessage::parse(&buf).unwrap_err();
        assert_eq!(Error::UnknownIcmpType(icmp_type), err);
    }

    #[test_case(0x81, 0, true; "echo reply code 0")]
    #[test_case(0x81, 1, false; "echo reply code 1")]
    #[test_case(0x03, 1, true; "time exceeded code 1")]
    #[test_case(0x03, 2, false; "time exceeded code 2")]
    #[test_case(0x01, 6, true; "unreachable code 6")]
    #[test_case(0x01, 7, false; "unreachable code 7")]
    #[test_case(0x80, 9, true; "echo request code unconstrained")]
    fn test_code_range(icmp_type: u8, code: u8, legal: bool) {
        let buf = [icmp_type, code, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let result = IcmpMessage::parse(&buf);
        if legal {
            assert!(result.is_ok());
        } else {
            assert_eq!(Err(Error::InvalidIcmpCode(icmp_type, code)), result);
        }
    }

    #[test]
    fn test_marshal_echo_request() {
        let message = IcmpMessage::EchoRequest {
            identifier: 0x1234,
            sequence: 0x0001,
        };
        assert_eq!(hex!("80 00 00 00 12 34 00 01").to_vec(), message.marshal());
    }

    #[test]
    fn test_marshal_time_exceeded() {
        let message = IcmpMessage::TimeExceeded {
            code: IcmpCode(1),
            invoking_packet: hex!("60 0a 0b 0c").to_vec(),
        };
        assert_eq!(
            hex!("03 01 00 00 00 00 00 00 60 0a 0b 0c").to_vec(),
            message.marshal()
        );
    }

    #[test]
    fn test_roundtrip() {
        let messages = [
            IcmpMessage::EchoRequest {
                identifier: 0xffff,
                sequence: 0,
            },
            IcmpMessage::EchoReply {
                identifier: 1,
                sequence: 0x8000,
            },
            IcmpMessage::TimeExceeded {
                code: IcmpCode(0),
                invoking_packet: vec![0x60; 48],
            },
            IcmpMessage::DestinationUnreachable {
                code: IcmpCode(3),
                invoking_packet: vec![],
            },
        ];
        for message in messages {
            assert_eq!(message, IcmpMessage::parse(&message.marshal()).unwrap());
        }
    }

    #[test]
    fn test_set_checksum() {
        let mut buf = hex!("80 00 00 00 12 34 00 01");
        set_checksum(&mut buf, 0x1213);
        assert_eq!(hex!("80 00 12 13 12 34 00 01"), buf);
    }
}
