//! Trace6 - An IPv6 ICMPv6 traceroute library.
//!
//! This crate provides the probe session used by the standalone `trace6`
//! binary. It sends sequenced echo requests with increasing hop limits and
//! classifies the responses, one hop at a time, to reconstruct the route to
//! a target host.
//!
//! A dedicated receive thread captures raw `IPv6` datagrams for the lifetime
//! of the process and correlates them against the probe currently awaiting a
//! response. The session races each probe against a per-probe deadline, so a
//! hop that never answers is reported as a timeout rather than an error.
//!
//! # Example
//!
//! The following example builds and runs a tracer with default configuration
//! and prints each hop report as it completes:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::Ipv6Addr;
//! # use std::str::FromStr;
//! use trace6_core::Builder;
//!
//! let addr = Ipv6Addr::from_str("2001:db8::2")?;
//! let outcome = Builder::new(addr)
//!     .build()?
//!     .run_with(|hop| println!("{hop:?}"))?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Tracer`].
//! - [`Tracer::run`] - Run the tracer on the current thread.
//! - [`Tracer::run_with`] - Run the tracer with a custom hop handler.
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::use_self,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc
)]
#![deny(unsafe_code)]

mod builder;
mod config;
mod constants;
mod correlate;
mod error;
mod net;
mod probe;
mod session;
mod tracer;
mod types;

pub use builder::Builder;
pub use config::{defaults, SessionConfig};
pub use constants::MAX_PACKET_SIZE;
pub use error::{Error, IoError, IoOperation, Result};
pub use net::{DatagramSource, ProbeSender};
pub use probe::{HopReport, OutcomeKind, Probe, ProbeOutcome, TraceOutcome};
pub use session::Session;
pub use tracer::Tracer;
pub use types::{Generation, MaxHops, ProbeAttempts, Sequence, TimeToLive, TraceId};

pub use trace6_packet::icmpv6::IcmpCode;
