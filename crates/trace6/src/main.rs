use anyhow::anyhow;
use clap::Parser;
use std::net::{IpAddr, Ipv6Addr, ToSocketAddrs};
use std::process::ExitCode;
use std::time::Duration;
use trace6_core::{defaults, Builder, HopReport, OutcomeKind, TraceOutcome};
use tracing_subscriber::EnvFilter;

/// Trace the IPv6 route to a host.
#[derive(Parser, Debug)]
#[command(name = "trace6", version, about = "An IPv6 ICMPv6 traceroute")]
struct Args {
    /// The network interface to trace from
    #[arg(short = 'i', value_name = "INTERFACE", default_value = defaults::DEFAULT_INTERFACE)]
    interface: String,

    /// The per-probe timeout in seconds
    #[arg(short = 't', value_name = "SECONDS", default_value_t = 5)]
    timeout: u64,

    /// The number of probes per hop
    #[arg(short = 'q', value_name = "ATTEMPTS", default_value_t = defaults::DEFAULT_ATTEMPTS)]
    attempts: u8,

    /// The maximum number of hops
    #[arg(short = 'm', value_name = "MAXHOPS", default_value_t = defaults::DEFAULT_MAX_HOPS)]
    max_hops: u8,

    /// The target, an IPv6 address or a name which resolves to one
    target: String,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let target = resolve_target(&args.target)?;
    let tracer = Builder::new(target)
        .interface(&args.interface)
        .timeout(Duration::from_secs(args.timeout))
        .attempts(args.attempts)
        .max_hops(args.max_hops)
        .build()?;
    let outcome = tracer.run_with(print_hop)?;
    // reaching or terminating at the destination exits with 1
    Ok(match outcome {
        TraceOutcome::TargetReached | TraceOutcome::Unreachable => ExitCode::from(1),
        TraceOutcome::MaxHopsExhausted => ExitCode::SUCCESS,
    })
}

/// Print one line per hop, one column per attempt.
fn print_hop(report: &HopReport) {
    print!("{:2}", report.ttl.0);
    for outcome in &report.outcomes {
        match outcome {
            OutcomeKind::Timeout => print!("  *"),
            OutcomeKind::EchoReply { addr } | OutcomeKind::TimeExceeded { addr } => {
                print!("  {addr}");
            }
            OutcomeKind::DestinationUnreachable { addr, code } => print!("  {addr}!{}", code.0),
        }
    }
    println!();
}

/// Resolve `target` to an IPv6 address, rejecting IPv4.
fn resolve_target(target: &str) -> anyhow::Result<Ipv6Addr> {
    if let Ok(addr) = target.parse::<IpAddr>() {
        return match addr {
            IpAddr::V6(addr) => Ok(addr),
            IpAddr::V4(addr) => Err(anyhow!("IPv6 target required, got {addr}")),
        };
    }
    (target, 0)
        .to_socket_addrs()
        .map_err(|err| anyhow!("failed to resolve {target}: {err}"))?
        .find_map(|addr| match addr.ip() {
            IpAddr::V6(addr) => Some(addr),
            IpAddr::V4(_) => None,
        })
        .ok_or_else(|| anyhow!("no IPv6 address for {target}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::parse_from(["trace6", "2001:db8::2"]);
        assert_eq!("eth0", args.interface);
        assert_eq!(5, args.timeout);
        assert_eq!(3, args.attempts);
        assert_eq!(15, args.max_hops);
        assert_eq!("2001:db8::2", args.target);
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "trace6", "-i", "wlan0", "-t", "2", "-q", "5", "-m", "30", "::1",
        ]);
        assert_eq!("wlan0", args.interface);
        assert_eq!(2, args.timeout);
        assert_eq!(5, args.attempts);
        assert_eq!(30, args.max_hops);
    }

    #[test]
    fn test_resolve_ipv6_literal() {
        assert_eq!(
            "2001:db8::2".parse::<Ipv6Addr>().unwrap(),
            resolve_target("2001:db8::2").unwrap()
        );
    }

    #[test]
    fn test_resolve_rejects_ipv4_literal() {
        assert!(resolve_target("192.0.2.1").is_err());
    }
}
