//! Station delivery errors

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrintError {
    /// Station address could not be parsed or resolved
    #[error("Invalid station address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Refused, unreachable, reset during connect
    #[error("Cannot reach station {addr}: {source}")]
    Connection {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Connected, but writing the job failed
    #[error("Write to station failed: {0}")]
    Io(#[from] std::io::Error),

    /// Lookup, connect and write together took longer than allowed
    #[error("Station {address} did not accept the job within {after:?}")]
    Timeout { address: String, after: Duration },
}

impl PrintError {
    fn invalid(address: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn empty_address() -> Self {
        Self::invalid("", "empty")
    }

    pub(crate) fn bad_port(address: &str) -> Self {
        Self::invalid(address, "port is not a number")
    }

    pub(crate) fn unresolved(address: &str) -> Self {
        Self::invalid(address, "host does not resolve")
    }
}

pub type PrintResult<T> = Result<T, PrintError>;
