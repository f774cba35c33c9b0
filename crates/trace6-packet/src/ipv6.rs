use crate::error::{Error, Result};
use crate::IpProtocol;
use std::net::Ipv6Addr;

const VERSION_OFFSET: usize = 0;
const TRAFFIC_CLASS_OFFSET: usize = 0;
const FLOW_LABEL_OFFSET: usize = 1;
const PAYLOAD_LENGTH_OFFSET: usize = 4;
const NEXT_HEADER_OFFSET: usize = 6;
const HOP_LIMIT_OFFSET: usize = 7;
const SOURCE_OFFSET: usize = 8;
const DESTINATION_OFFSET: usize = 24;

/// The fixed `IPv6` header size.
pub const HEADER_SIZE: usize = 40;

/// The bound on the number of extension headers accepted in a single chain.
const MAX_EXTENSION_HEADERS: usize = 16;

/// A parsed `IPv6` extension header.
///
/// Only created during parsing, never re-serialized.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExtensionHeader {
    /// The protocol of the following header.
    pub next_header: IpProtocol,
    /// The header length in 8 byte units beyond the first 8 bytes.
    pub length: u8,
    /// The option bytes following the fixed two byte prefix.
    pub options: Vec<u8>,
}

/// An `IPv6` header.
///
/// The version field is implicit, it is validated on parse and emitted on
/// marshal but never stored.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Ipv6Header {
    pub traffic_class: u8,
    pub flow_label: u32,
    pub payload_length: u16,
    pub next_header: IpProtocol,
    pub hop_limit: u8,
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
    pub extensions: Vec<ExtensionHeader>,
}

impl Ipv6Header {
    /// Create a header for an `ICMPv6` probe from `source` to `destination`.
    #[must_use]
    pub const fn new(source: Ipv6Addr, destination: Ipv6Addr) -> Self {
        Self {
            traffic_class: 0,
            flow_label: 0,
            payload_length: 0,
            next_header: IpProtocol::IcmpV6,
            hop_limit: 0,
            source,
            destination,
            extensions: Vec::new(),
        }
    }

    /// Parse an `IPv6` header and its extension header chain.
    ///
    /// On success returns the header together with the offset of the first
    /// byte after all extension headers, which is where the upper layer
    /// payload begins.
    ///
    /// The chain walk is bounded by the buffer and by
    /// `MAX_EXTENSION_HEADERS`, a chain which would run past either fails
    /// with `Error::MalformedExtensionChain`.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::InsufficientPacketBuffer(
                String::from("Ipv6"),
                HEADER_SIZE,
                buf.len(),
            ));
        }
        let version = (buf[VERSION_OFFSET] & 0xf0) >> 4;
        if version != 6 {
            return Err(Error::InvalidVersion(version));
        }
        let traffic_class =
            ((buf[TRAFFIC_CLASS_OFFSET] & 0x0f) << 4) | ((buf[FLOW_LABEL_OFFSET] & 0xf0) >> 4);
        let flow_label = (u32::from(buf[FLOW_LABEL_OFFSET] & 0x0f) << 16)
            | (u32::from(buf[FLOW_LABEL_OFFSET + 1]) << 8)
            | u32::from(buf[FLOW_LABEL_OFFSET + 2]);
        let payload_length =
            u16::from_be_bytes([buf[PAYLOAD_LENGTH_OFFSET], buf[PAYLOAD_LENGTH_OFFSET + 1]]);
        let next_header = IpProtocol::from(buf[NEXT_HEADER_OFFSET]);
        let hop_limit = buf[HOP_LIMIT_OFFSET];
        let source = addr_at(buf, SOURCE_OFFSET);
        let destination = addr_at(buf, DESTINATION_OFFSET);
        let mut extensions = Vec::new();
        let mut offset = HEADER_SIZE;
        let mut current = next_header;
        while current.is_extension() {
            if extensions.len() == MAX_EXTENSION_HEADERS || offset + 2 > buf.len() {
                return Err(Error::MalformedExtensionChain(offset));
            }
            let ext_next_header = IpProtocol::from(buf[offset]);
            let length = buf[offset + 1];
            let size = 8 * (1 + usize::from(length));
            if offset + size > buf.len() {
                return Err(Error::MalformedExtensionChain(offset));
            }
            extensions.push(ExtensionHeader {
                next_header: ext_next_header,
                length,
                options: buf[offset + 2..offset + size].to_vec(),
            });
            offset += size;
            current = ext_next_header;
        }
        Ok((
            Self {
                traffic_class,
                flow_label,
                payload_length,
                next_header,
                hop_limit,
                source,
                destination,
                extensions,
            },
            offset,
        ))
    }

    /// Marshal the fixed 40 byte header.
    ///
    /// Probes built by this crate never carry extension headers so only the
    /// fixed form is rendered.
    #[must_use]
    pub fn marshal(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0_u8; HEADER_SIZE];
        buf[VERSION_OFFSET] = (6 << 4) | ((self.traffic_class & 0xf0) >> 4);
        buf[FLOW_LABEL_OFFSET] =
            ((self.traffic_class & 0x0f) << 4) | ((self.flow_label >> 16) & 0x0f) as u8;
        buf[FLOW_LABEL_OFFSET + 1] = ((self.flow_label >> 8) & 0xff) as u8;
        buf[FLOW_LABEL_OFFSET + 2] = (self.flow_label & 0xff) as u8;
        buf[PAYLOAD_LENGTH_OFFSET..NEXT_HEADER_OFFSET]
            .copy_from_slice(&self.payload_length.to_be_bytes());
        buf[NEXT_HEADER_OFFSET] = self.next_header.id();
        buf[HOP_LIMIT_OFFSET] = self.hop_limit;
        buf[SOURCE_OFFSET..DESTINATION_OFFSET].copy_from_slice(&self.source.octets());
        buf[DESTINATION_OFFSET..HEADER_SIZE].copy_from_slice(&self.destination.octets());
        buf
    }
}

fn addr_at(buf: &[u8], offset: usize) -> Ipv6Addr {
    let mut octets = [0_u8; 16];
    octets.copy_from_slice(&buf[offset..offset + 16]);
    Ipv6Addr::from(octets)
}
