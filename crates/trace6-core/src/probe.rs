use crate::types::{Generation, Sequence, TimeToLive, TraceId};
use std::net::Ipv6Addr;
use trace6_packet::icmpv6::IcmpCode;

/// The probe currently awaiting a response.
///
/// Written by the session before each send and read by the receive thread
/// while classifying responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// The echo request identifier, fixed for the run.
    pub identifier: TraceId,
    /// The echo request sequence, unique to this attempt.
    pub sequence: Sequence,
    /// The hop limit this probe was sent with.
    pub ttl: TimeToLive,
    /// The attempt generation this probe belongs to.
    pub generation: Generation,
}

/// The kind of outcome observed for a probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The target answered our echo request.
    EchoReply { addr: Ipv6Addr },
    /// An intermediate node exhausted the hop limit.
    TimeExceeded { addr: Ipv6Addr },
    /// A node reported the destination unreachable.
    ///
    /// `addr` is the destination of the embedded invoking packet, not the
    /// responding node.
    DestinationUnreachable { addr: Ipv6Addr, code: IcmpCode },
    /// No relevant response arrived within the deadline.
    Timeout,
}

/// The classified outcome of a single probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// What was observed.
    pub kind: OutcomeKind,
    /// The generation of the probe this outcome answers.
    pub generation: Generation,
}

/// The per-attempt outcomes for a single hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopReport {
    /// The hop limit probed.
    pub ttl: TimeToLive,
    /// One outcome per attempt, in send order.
    pub outcomes: Vec<OutcomeKind>,
}

/// How a completed trace ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOutcome {
    /// The target answered an echo request.
    TargetReached,
    /// A node reported the destination unreachable.
    Unreachable,
    /// The maximum hop count was exhausted without reaching the target.
    MaxHopsExhausted,
}
