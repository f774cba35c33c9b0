use crate::config::defaults::LOCAL_ADDR_ENV;
use crate::error::{Error, IoError, IoOperation, Result};
use std::net::Ipv6Addr;
use tracing::instrument;

/// The source address probes are sent from.
pub struct SourceAddr;

impl SourceAddr {
    /// Discover the source address for `interface`.
    ///
    /// The `TRACE6_LADDR` environment variable takes precedence over
    /// interface discovery, for environments where the interface addresses
    /// cannot be relied upon.
    #[instrument(level = "debug")]
    pub fn discover(interface: &str) -> Result<Ipv6Addr> {
        if let Ok(value) = std::env::var(LOCAL_ADDR_ENV) {
            return value
                .parse::<Ipv6Addr>()
                .map_err(|_| Error::InvalidSourceAddr(value));
        }
        lookup_interface_addr_ipv6(interface)
    }
}

/// The first global `IPv6` address of the named interface.
///
/// Falls back to a link local address when nothing better is configured.
fn lookup_interface_addr_ipv6(name: &str) -> Result<Ipv6Addr> {
    let mut found = false;
    let mut link_local = None;
    let addrs = nix::ifaddrs::getifaddrs()
        .map_err(|err| IoError::Other(std::io::Error::from(err), IoOperation::ReadInterfaces))?;
    for ifaddr in addrs {
        if ifaddr.interface_name != name {
            continue;
        }
        found = true;
        let Some(addr) = ifaddr.address.as_ref().and_then(|addr| addr.as_sockaddr_in6()) else {
            continue;
        };
        let ip = addr.ip();
        if is_link_local(ip) {
            link_local.get_or_insert(ip);
        } else {
            return Ok(ip);
        }
    }
    match (link_local, found) {
        (Some(ip), _) => Ok(ip),
        (None, true) => Err(Error::NoSourceAddr(String::from(name))),
        (None, false) => Err(Error::UnknownInterface(String::from(name))),
    }
}

const fn is_link_local(ip: Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfe80
}
