use crate::error::Result;
use crate::net::socket::{Socket, SocketImpl};
use crate::net::{DatagramSource, ProbeSender};
use std::net::{Ipv6Addr, SocketAddrV6};
use trace6_packet::ipv6::Ipv6Header;
use tracing::instrument;

/// The send half of the probe channel.
///
/// Probes arrive here as whole `IPv6` datagrams. The kernel owns the outer
/// header on the raw `ICMPv6` socket, so the hop limit is applied as a
/// socket option and only the `ICMPv6` payload goes to the wire.
#[derive(Debug)]
pub struct ChannelSender<S: Socket = SocketImpl> {
    socket: S,
}

impl ChannelSender<SocketImpl> {
    /// Create the send half bound to `source`.
    pub fn connect(source: Ipv6Addr) -> Result<Self> {
        Ok(Self::new(SocketImpl::new_icmp_send_socket_ipv6(source)?))
    }
}

impl<S: Socket> ChannelSender<S> {
    pub const fn new(socket: S) -> Self {
        Self { socket }
    }
}

impl<S: Socket> ProbeSender for ChannelSender<S> {
    #[instrument(skip(self, packet), level = "trace")]
    fn send(&mut self, packet: &[u8], dest: Ipv6Addr) -> Result<()> {
        let (header, payload_offset) = Ipv6Header::parse(packet)?;
        self.socket.set_unicast_hops_v6(header.hop_limit)?;
        self.socket
            .send_to(&packet[payload_offset..], SocketAddrV6::new(dest, 0, 0, 0))?;
        Ok(())
    }
}

/// The receive half of the probe channel.
///
/// Moved into the receive thread for the lifetime of the process.
#[derive(Debug)]
pub struct ChannelSource<S: Socket = SocketImpl> {
    socket: S,
}

impl ChannelSource<SocketImpl> {
    /// Open the capture socket.
    pub fn open() -> Result<Self> {
        Ok(Self::new(SocketImpl::new_recv_socket_ipv6()?))
    }
}

impl<S: Socket> ChannelSource<S> {
    pub const fn new(socket: S) -> Self {
        Self { socket }
    }
}

impl<S: Socket + Send> DatagramSource for ChannelSource<S> {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.socket.recv(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::socket::MockSocket;
    use std::str::FromStr;
    use trace6_packet::icmpv6::IcmpMessage;
    use trace6_packet::ipv6::HEADER_SIZE;

    fn probe_packet(hop_limit: u8) -> Vec<u8> {
        let src = Ipv6Addr::from_str("2001:db8::1").unwrap();
        let dest = Ipv6Addr::from_str("2001:db8::2").unwrap();
        let icmp = IcmpMessage::EchoRequest {
            identifier: 0xbeef,
            sequence: 42,
        }
        .marshal();
        let mut header = Ipv6Header::new(src, dest);
        header.payload_length = icmp.len() as u16;
        header.hop_limit = hop_limit;
        let mut buf = header.marshal().to_vec();
        buf.extend_from_slice(&icmp);
        buf
    }

    #[test]
    fn test_send_applies_hop_limit_and_strips_header() {
        let dest = Ipv6Addr::from_str("2001:db8::2").unwrap();
        let packet = probe_packet(5);
        let expected = packet[HEADER_SIZE..].to_vec();
        let mut socket = MockSocket::new();
        socket
            .expect_set_unicast_hops_v6()
            .with(mockall::predicate::eq(5))
            .times(1)
            .returning(|_| Ok(()));
        socket
            .expect_send_to()
            .withf(move |buf, addr| {
                buf == expected.as_slice() && *addr == SocketAddrV6::new(dest, 0, 0, 0)
            })
            .times(1)
            .returning(|buf, _| Ok(buf.len()));
        let mut sender = ChannelSender::new(socket);
        sender.send(&packet, dest).unwrap();
    }

    #[test]
    fn test_send_rejects_invalid_packet() {
        let dest = Ipv6Addr::from_str("2001:db8::2").unwrap();
        let mut sender = ChannelSender::new(MockSocket::new());
        assert!(sender.send(&[0_u8; 39], dest).is_err());
    }

    #[test]
    fn test_recv_delegates() {
        let datagram = probe_packet(1);
        let copy = datagram.clone();
        let mut socket = MockSocket::new();
        socket.expect_recv().times(1).returning(move |buf| {
            buf[..copy.len()].copy_from_slice(&copy);
            Ok(copy.len())
        });
        let mut source = ChannelSource::new(socket);
        let mut buf = [0_u8; 64];
        let read = source.recv(&mut buf).unwrap();
        assert_eq!(datagram.len(), read);
        assert_eq!(datagram.as_slice(), &buf[..read]);
    }
}
