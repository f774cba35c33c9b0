use crate::config::SessionConfig;
use crate::error::Result;
use crate::net::channel::{ChannelSender, ChannelSource};
use crate::probe::{HopReport, TraceOutcome};
use crate::session::Session;

/// An `IPv6` `ICMPv6` traceroute.
///
/// Built by a [`Builder`](crate::Builder), which resolves the source
/// address and fills in defaults.
#[derive(Debug)]
pub struct Tracer {
    config: SessionConfig,
}

impl Tracer {
    pub(crate) const fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the trace, discarding hop reports.
    pub fn run(&self) -> Result<TraceOutcome> {
        self.run_with(|_| {})
    }

    /// Run the trace, invoking `publish` as each hop completes.
    ///
    /// Opens the raw sockets, which requires elevated privileges, and runs
    /// the probe session on the current thread.
    pub fn run_with<F: Fn(&HopReport)>(&self, publish: F) -> Result<TraceOutcome> {
        let sender = ChannelSender::connect(self.config.source_addr)?;
        let source = ChannelSource::open()?;
        Session::new(self.config.clone(), publish).run(sender, source)
    }

    /// The resolved session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }
}
