use crate::error::Result;
use std::net::Ipv6Addr;

/// A network channel over raw sockets.
pub mod channel;

/// A socket abstraction.
pub mod socket;

/// Source address discovery.
pub mod source;

/// Sends rendered probe datagrams to the wire.
#[cfg_attr(test, mockall::automock)]
pub trait ProbeSender {
    /// Send a fully formed `IPv6` datagram to `dest`.
    fn send(&mut self, packet: &[u8], dest: Ipv6Addr) -> Result<()>;
}

/// Delivers raw `IPv6` datagrams from the wire.
#[cfg_attr(test, mockall::automock)]
pub trait DatagramSource: Send {
    /// Block until the next datagram arrives, read it into `buf` and return
    /// the number of bytes read.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;
}
