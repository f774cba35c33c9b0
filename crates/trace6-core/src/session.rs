use crate::config::SessionConfig;
use crate::constants::MAX_PACKET_SIZE;
use crate::correlate::Correlator;
use crate::error::Result;
use crate::net::{DatagramSource, ProbeSender};
use crate::probe::{HopReport, OutcomeKind, Probe, ProbeOutcome, TraceOutcome};
use crate::types::{Generation, Sequence, TimeToLive};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use trace6_packet::checksum::icmp_ipv6_checksum;
use trace6_packet::icmpv6::{self, IcmpMessage};
use trace6_packet::ipv6::{Ipv6Header, HEADER_SIZE};
use tracing::instrument;

/// The size of a rendered probe, the fixed header plus an echo request.
const PROBE_SIZE: usize = HEADER_SIZE + icmpv6::MIN_PACKET_SIZE;

/// An `ICMPv6` probe session.
///
/// Drives the hop and attempt loop with a single probe outstanding at a
/// time. Each attempt follows a fixed lifecycle: render the probe for the
/// current hop limit and sequence, hand it to the sender, then await either
/// an outcome from the correlator or the per-probe deadline, whichever comes
/// first.
#[derive(Debug)]
pub struct Session<F> {
    config: SessionConfig,
    publish: F,
}

impl<F: Fn(&HopReport)> Session<F> {
    pub const fn new(config: SessionConfig, publish: F) -> Self {
        Self { config, publish }
    }

    /// Run the session to completion.
    ///
    /// Spawns the receive loop over `source` and probes each hop in turn
    /// until the target answers, a node reports it unreachable or the
    /// maximum hop count is exhausted. One `HopReport` is published per
    /// probed hop.
    ///
    /// The receive thread is not joined, process exit tears it down.
    #[instrument(skip_all)]
    pub fn run<S, D>(&self, mut sender: S, source: D) -> Result<TraceOutcome>
    where
        S: ProbeSender,
        D: DatagramSource + 'static,
    {
        let outstanding = Arc::new(RwLock::new(Probe {
            identifier: self.config.trace_identifier,
            sequence: Sequence(0),
            ttl: TimeToLive(0),
            generation: Generation(0),
        }));
        let correlator = Correlator::new(
            self.config.source_addr,
            self.config.target_addr,
            Arc::clone(&outstanding),
        );
        let (tx, rx) = bounded::<ProbeOutcome>(1);
        thread::spawn(move || receive_loop(source, correlator, tx));
        let mut sequence = Sequence(0);
        let mut generation = Generation(0);
        for ttl in 1..=self.config.max_hops.0 {
            let mut report = HopReport {
                ttl: TimeToLive(ttl),
                outcomes: Vec::with_capacity(usize::from(self.config.attempts.0)),
            };
            let mut terminal = None;
            for _ in 0..self.config.attempts.0 {
                generation += Generation(1);
                let probe = Probe {
                    identifier: self.config.trace_identifier,
                    sequence,
                    ttl: TimeToLive(ttl),
                    generation,
                };
                sequence += Sequence(1);
                *outstanding.write() = probe;
                let packet = self.render_probe(&probe);
                sender.send(&packet, self.config.target_addr)?;
                tracing::debug!(?probe, "probe sent");
                let outcome = self.await_outcome(&rx, generation);
                match outcome {
                    OutcomeKind::EchoReply { .. } => {
                        terminal.get_or_insert(TraceOutcome::TargetReached);
                    }
                    OutcomeKind::DestinationUnreachable { .. } => {
                        terminal.get_or_insert(TraceOutcome::Unreachable);
                    }
                    OutcomeKind::TimeExceeded { .. } | OutcomeKind::Timeout => {}
                }
                report.outcomes.push(outcome);
            }
            (self.publish)(&report);
            if let Some(outcome) = terminal {
                return Ok(outcome);
            }
        }
        Ok(TraceOutcome::MaxHopsExhausted)
    }

    /// Render the probe as a whole `IPv6` datagram with the checksum
    /// stamped.
    fn render_probe(&self, probe: &Probe) -> [u8; PROBE_SIZE] {
        let mut header = Ipv6Header::new(self.config.source_addr, self.config.target_addr);
        header.payload_length = icmpv6::MIN_PACKET_SIZE as u16;
        header.hop_limit = probe.ttl.0;
        let echo = IcmpMessage::EchoRequest {
            identifier: probe.identifier.0,
            sequence: probe.sequence.0,
        };
        let mut icmp = echo.marshal();
        let checksum =
            icmp_ipv6_checksum(&icmp, self.config.source_addr, self.config.target_addr);
        icmpv6::set_checksum(&mut icmp, checksum);
        let mut packet = [0_u8; PROBE_SIZE];
        packet[..HEADER_SIZE].copy_from_slice(&header.marshal());
        packet[HEADER_SIZE..].copy_from_slice(&icmp);
        packet
    }

    /// Await the outcome of the attempt identified by `generation`.
    ///
    /// Outcomes for earlier, already decided attempts may still be sitting
    /// in the handoff slot and are discarded here rather than misattributed
    /// to the current attempt.
    fn await_outcome(&self, rx: &Receiver<ProbeOutcome>, generation: Generation) -> OutcomeKind {
        let deadline = Instant::now() + self.config.timeout;
        loop {
            match rx.recv_deadline(deadline) {
                Ok(outcome) if outcome.generation == generation => return outcome.kind,
                Ok(stale) => {
                    tracing::trace!(?stale, "discarding outcome for a decided attempt");
                }
                Err(RecvTimeoutError::Timeout) => return OutcomeKind::Timeout,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("receive loop gone, treating as timeout");
                    return OutcomeKind::Timeout;
                }
            }
        }
    }
}

/// Read datagrams for the lifetime of the process and feed them to the
/// correlator, publishing outcomes onto the single slot handoff channel.
///
/// The handoff never blocks this loop, an undeliverable outcome is dropped.
fn receive_loop<D: DatagramSource>(mut source: D, correlator: Correlator, tx: Sender<ProbeOutcome>) {
    let mut buf = [0_u8; MAX_PACKET_SIZE];
    loop {
        let read = match source.recv(&mut buf) {
            Ok(read) => read,
            Err(err) => {
                tracing::debug!(%err, "receive loop terminated");
                return;
            }
        };
        if let Some(outcome) = correlator.classify(&buf[..read]) {
            if tx.try_send(outcome).is_err() {
                tracing::trace!("handoff slot full or closed, outcome dropped");
            }
        }
    }
}
