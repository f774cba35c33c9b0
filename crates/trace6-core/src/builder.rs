use crate::config::{defaults, SessionConfig};
use crate::error::{Error, Result};
use crate::net::source::SourceAddr;
use crate::tracer::Tracer;
use crate::types::{MaxHops, ProbeAttempts, TraceId};
use std::net::Ipv6Addr;
use std::time::Duration;

/// Build a [`Tracer`].
///
/// # Example
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use std::net::Ipv6Addr;
/// use std::str::FromStr;
/// use std::time::Duration;
/// use trace6_core::Builder;
///
/// let addr = Ipv6Addr::from_str("2001:db8::2")?;
/// let tracer = Builder::new(addr)
///     .interface("eth1")
///     .timeout(Duration::from_secs(2))
///     .attempts(5)
///     .max_hops(30)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Builder {
    target_addr: Ipv6Addr,
    interface: String,
    source_addr: Option<Ipv6Addr>,
    trace_identifier: Option<TraceId>,
    timeout: Duration,
    attempts: ProbeAttempts,
    max_hops: MaxHops,
}

impl Builder {
    /// Build a tracer for `target_addr` with default configuration.
    #[must_use]
    pub fn new(target_addr: Ipv6Addr) -> Self {
        Self {
            target_addr,
            interface: String::from(defaults::DEFAULT_INTERFACE),
            source_addr: None,
            trace_identifier: None,
            timeout: defaults::DEFAULT_TIMEOUT,
            attempts: ProbeAttempts(defaults::DEFAULT_ATTEMPTS),
            max_hops: MaxHops(defaults::DEFAULT_MAX_HOPS),
        }
    }

    /// Set the interface the source address is discovered from.
    #[must_use]
    pub fn interface(self, interface: &str) -> Self {
        Self {
            interface: String::from(interface),
            ..self
        }
    }

    /// Set the source address, bypassing discovery.
    #[must_use]
    pub fn source_addr(self, source_addr: Option<Ipv6Addr>) -> Self {
        Self {
            source_addr,
            ..self
        }
    }

    /// Set the echo request identifier, random when unset.
    #[must_use]
    pub fn trace_identifier(self, identifier: u16) -> Self {
        Self {
            trace_identifier: Some(TraceId(identifier)),
            ..self
        }
    }

    /// Set the per-probe timeout.
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Set the number of probes per hop.
    #[must_use]
    pub fn attempts(self, attempts: u8) -> Self {
        Self {
            attempts: ProbeAttempts(attempts),
            ..self
        }
    }

    /// Set the maximum number of hops.
    #[must_use]
    pub fn max_hops(self, max_hops: u8) -> Self {
        Self {
            max_hops: MaxHops(max_hops),
            ..self
        }
    }

    /// Build the tracer.
    pub fn build(self) -> Result<Tracer> {
        if self.attempts.0 == 0 {
            return Err(Error::BadConfig(String::from(
                "attempts must be greater than zero",
            )));
        }
        if self.max_hops.0 == 0 {
            return Err(Error::BadConfig(String::from(
                "max hops must be greater than zero",
            )));
        }
        let source_addr = match self.source_addr {
            Some(addr) => addr,
            None => SourceAddr::discover(&self.interface)?,
        };
        let trace_identifier = self
            .trace_identifier
            .unwrap_or_else(|| TraceId(rand::random()));
        Ok(Tracer::new(SessionConfig {
            target_addr: self.target_addr,
            source_addr,
            trace_identifier,
            timeout: self.timeout,
            attempts: self.attempts,
            max_hops: self.max_hops,
        }))
    }
}
