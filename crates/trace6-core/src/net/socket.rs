use crate::error::{IoError, IoOperation, IoResult};
use socket2::{Domain, Protocol, SockAddr, Type};
use std::io::Read;
use std::net::{Ipv6Addr, SocketAddr, SocketAddrV6};

/// `ETH_P_IPV6`, the link layer protocol of the capture socket.
const ETH_P_IPV6: u16 = 0x86dd;

/// A socket for sending probes and capturing responses.
#[cfg_attr(test, mockall::automock)]
pub trait Socket {
    /// Set the hop limit for outgoing unicast datagrams.
    fn set_unicast_hops_v6(&mut self, hops: u8) -> IoResult<()>;
    /// Send `buf` to `addr`.
    fn send_to(&mut self, buf: &[u8], addr: SocketAddrV6) -> IoResult<usize>;
    /// Block until data arrives and read it into `buf`.
    fn recv(&mut self, buf: &mut [u8]) -> IoResult<usize>;
}

/// A socket backed by `socket2`.
#[derive(Debug)]
pub struct SocketImpl {
    inner: socket2::Socket,
}

impl SocketImpl {
    /// Create the raw `ICMPv6` socket probes are sent from.
    ///
    /// Bound to `source` so the kernel stamps the address the correlator
    /// filters on.
    pub fn new_icmp_send_socket_ipv6(source: Ipv6Addr) -> IoResult<Self> {
        let socket = socket2::Socket::new(Domain::IPV6, Type::RAW, Some(Protocol::ICMPV6))
            .map_err(|err| IoError::Other(err, IoOperation::NewSocket))?;
        let addr = SocketAddr::V6(SocketAddrV6::new(source, 0, 0, 0));
        socket
            .bind(&SockAddr::from(addr))
            .map_err(|err| IoError::Bind(err, addr))?;
        Ok(Self { inner: socket })
    }

    /// Create the link layer socket responses are captured from.
    ///
    /// A cooked packet socket delivers whole `IPv6` datagrams, outer header
    /// included, which the correlator needs for address and checksum
    /// filtering.
    pub fn new_recv_socket_ipv6() -> IoResult<Self> {
        let protocol = Protocol::from(i32::from(ETH_P_IPV6.to_be()));
        let socket = socket2::Socket::new(Domain::PACKET, Type::DGRAM, Some(protocol))
            .map_err(|err| IoError::Other(err, IoOperation::NewSocket))?;
        Ok(Self { inner: socket })
    }
}

impl Socket for SocketImpl {
    fn set_unicast_hops_v6(&mut self, hops: u8) -> IoResult<()> {
        self.inner
            .set_unicast_hops_v6(u32::from(hops))
            .map_err(|err| IoError::Other(err, IoOperation::SetUnicastHopsV6))
    }

    fn send_to(&mut self, buf: &[u8], addr: SocketAddrV6) -> IoResult<usize> {
        self.inner
            .send_to(buf, &SockAddr::from(addr))
            .map_err(|err| IoError::SendTo(err, SocketAddr::V6(addr)))
    }

    fn recv(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        self.inner
            .read(buf)
            .map_err(|err| IoError::Other(err, IoOperation::Recv))
    }
}
