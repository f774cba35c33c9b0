use crate::types::{MaxHops, ProbeAttempts, TraceId};
use std::net::Ipv6Addr;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use std::time::Duration;

    /// The default network interface to trace from.
    pub const DEFAULT_INTERFACE: &str = "eth0";

    /// The default per-probe timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// The default number of probes per hop.
    pub const DEFAULT_ATTEMPTS: u8 = 3;

    /// The default maximum number of hops.
    pub const DEFAULT_MAX_HOPS: u8 = 15;

    /// The environment variable which overrides source address discovery.
    pub const LOCAL_ADDR_ENV: &str = "TRACE6_LADDR";
}

/// Probe session configuration.
///
/// Created once at startup and read only thereafter, every component takes
/// what it needs from here rather than from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// The address being traced to.
    pub target_addr: Ipv6Addr,
    /// The local address probes are sent from.
    pub source_addr: Ipv6Addr,
    /// The echo request identifier for this run.
    pub trace_identifier: TraceId,
    /// How long to wait for a response to each probe.
    pub timeout: Duration,
    /// The number of probes per hop.
    pub attempts: ProbeAttempts,
    /// The hop limit at which the trace gives up.
    pub max_hops: MaxHops,
}
