use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// A tracer error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A tracer error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid packet: {0}")]
    PacketError(#[from] trace6_packet::error::Error),
    #[error("unknown interface: {0}")]
    UnknownInterface(String),
    #[error("no usable IPv6 address on interface: {0}")]
    NoSourceAddr(String),
    #[error("invalid source IP address: {0}")]
    InvalidSourceAddr(String),
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Bind error for {1}: {0}")]
    Bind(io::Error, SocketAddr),
    #[error("Sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("Failed to {0}: {1}")]
    Other(io::Error, IoOperation),
}

/// Io operation.
#[derive(Debug)]
pub enum IoOperation {
    NewSocket,
    Recv,
    SetUnicastHopsV6,
    ReadInterfaces,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::Recv => write!(f, "recv"),
            Self::SetUnicastHopsV6 => write!(f, "set unicast hops v6"),
            Self::ReadInterfaces => write!(f, "read interface addresses"),
        }
    }
}
