use crate::probe::{OutcomeKind, Probe, ProbeOutcome};
use parking_lot::RwLock;
use std::net::Ipv6Addr;
use std::sync::Arc;
use trace6_packet::checksum::verify_icmp_ipv6_checksum;
use trace6_packet::icmpv6::IcmpMessage;
use trace6_packet::ipv6::{Ipv6Header, HEADER_SIZE};
use tracing::instrument;

/// Classifies raw datagrams against the outstanding probe.
///
/// Owned by the receive thread, shares the outstanding probe with the
/// session which writes it before every send.
#[derive(Debug, Clone)]
pub struct Correlator {
    local_addr: Ipv6Addr,
    target_addr: Ipv6Addr,
    outstanding: Arc<RwLock<Probe>>,
}

impl Correlator {
    pub const fn new(
        local_addr: Ipv6Addr,
        target_addr: Ipv6Addr,
        outstanding: Arc<RwLock<Probe>>,
    ) -> Self {
        Self {
            local_addr,
            target_addr,
            outstanding,
        }
    }

    /// Classify one received datagram.
    ///
    /// Returns `None` for every datagram which is not a response to the
    /// outstanding probe: not addressed to us, failing checksum
    /// verification, unparseable, or an echo reply for a foreign or stale
    /// identifier, sequence or source.
    #[instrument(skip(self, buf), level = "trace")]
    pub fn classify(&self, buf: &[u8]) -> Option<ProbeOutcome> {
        let (header, payload_offset) = Ipv6Header::parse(buf).ok()?;
        if header.destination != self.local_addr {
            return None;
        }
        let icmp = icmp_slice(buf, &header, payload_offset)?;
        if !verify_icmp_ipv6_checksum(icmp, header.source, header.destination) {
            tracing::trace!(src = %header.source, "discarding datagram with invalid checksum");
            return None;
        }
        let message = IcmpMessage::parse(icmp).ok()?;
        let probe = *self.outstanding.read();
        let kind = match message {
            IcmpMessage::TimeExceeded { .. } => OutcomeKind::TimeExceeded {
                addr: header.source,
            },
            IcmpMessage::EchoReply {
                identifier,
                sequence,
            } => {
                if identifier == probe.identifier.0
                    && sequence == probe.sequence.0
                    && header.source == self.target_addr
                {
                    OutcomeKind::EchoReply {
                        addr: header.source,
                    }
                } else {
                    tracing::trace!(identifier, sequence, "discarding foreign or stale echo reply");
                    return None;
                }
            }
            IcmpMessage::DestinationUnreachable {
                code,
                invoking_packet,
            } => OutcomeKind::DestinationUnreachable {
                addr: embedded_destination(&invoking_packet)?,
                code,
            },
            // our own outgoing probes are visible on the receive path
            IcmpMessage::EchoRequest { .. } => return None,
        };
        Some(ProbeOutcome {
            kind,
            generation: probe.generation,
        })
    }
}

/// The `ICMPv6` bytes of a received datagram.
///
/// Delimited by the payload length declared in the outer header, less any
/// extension headers. A datagram shorter than its declared payload has been
/// truncated and cannot be verified, so yields `None`. Anything beyond the
/// declared payload is link layer padding and is dropped.
fn icmp_slice<'a>(buf: &'a [u8], header: &Ipv6Header, payload_offset: usize) -> Option<&'a [u8]> {
    let ext_len = payload_offset - HEADER_SIZE;
    let icmp_len = usize::from(header.payload_length).checked_sub(ext_len)?;
    let end = payload_offset.checked_add(icmp_len)?;
    if end > buf.len() {
        return None;
    }
    Some(&buf[payload_offset..end])
}

/// Locate the embedded `IPv6` header within an invoking packet and return
/// its destination address.
///
/// The invoking packet may be preceded by framing bytes so the scan looks
/// for the first byte whose version nibble is 6 and parses there.
fn embedded_destination(invoking_packet: &[u8]) -> Option<Ipv6Addr> {
    let start = invoking_packet.iter().position(|b| b >> 4 == 6)?;
    let (header, _) = Ipv6Header::parse(&invoking_packet[start..]).ok()?;
    Some(header.destination)
}
