//! Printer adapters for sending ESC/POS data
//!
//! Stations are raw TCP printers (port 9100). There is no application-level
//! acknowledgement: a job counts as sent once connect + write + flush
//! complete before the timeout.

use crate::error::{PrintError, PrintResult};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

/// Raw printing port used by almost every network thermal printer
pub const DEFAULT_PORT: u16 = 9100;

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Network printer (raw TCP)
///
/// The host is kept unresolved; name lookup happens inside the timed
/// send so a slow resolver counts against the job's timeout.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer from host and port
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        let host = host.trim().trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(PrintError::empty_address());
        }
        Ok(Self {
            host: host.to_string(),
            port,
            timeout: Duration::from_secs(8),
        })
    }

    /// Create from a station address
    ///
    /// Accepts either `"192.168.0.106"` (port defaults to `default_port`),
    /// a full `"192.168.0.106:9100"` or a host name such as `"bar-printer:9100"`.
    pub fn from_station(address: &str, default_port: u16) -> PrintResult<Self> {
        let address = address.trim();
        if address.is_empty() {
            return Err(PrintError::empty_address());
        }
        if let Ok(addr) = address.parse::<SocketAddr>() {
            return Self::new(&addr.ip().to_string(), addr.port());
        }
        match address.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => {
                let port: u16 = port.parse().map_err(|_| PrintError::bad_port(address))?;
                Self::new(host, port)
            }
            _ => Self::new(address, default_port),
        }
    }

    /// Set the timeout covering lookup, connect and write
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, IPv6 hosts in brackets
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Connect to the first resolved address that accepts
    async fn connect(&self) -> PrintResult<TcpStream> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|_| PrintError::unresolved(&self.address()))?
            .collect();

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(source) => last_err = Some(PrintError::Connection { addr, source }),
            }
        }
        Err(last_err.unwrap_or_else(|| PrintError::unresolved(&self.address())))
    }

    async fn send(&self, data: &[u8]) -> PrintResult<()> {
        let mut stream = self.connect().await?;

        info!("Connected, sending {} bytes", data.len());

        stream.write_all(data).await?;
        stream.flush().await?;
        stream.shutdown().await?;
        Ok(())
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(data), fields(addr = %self.address(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        info!("Connecting to printer");

        tokio::time::timeout(self.timeout, self.send(data))
            .await
            .map_err(|_| PrintError::Timeout {
                address: self.address(),
                after: self.timeout,
            })??;

        info!("Print job sent successfully");
        Ok(())
    }

    #[instrument(fields(addr = %self.address()))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match tokio::time::timeout(check_timeout, self.connect()).await {
            Ok(Ok(_)) => {
                info!("Printer online");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_network_printer_new() {
        let printer = NetworkPrinter::new("192.168.1.100", 9100).unwrap();
        assert_eq!(printer.address(), "192.168.1.100:9100");
        assert!(NetworkPrinter::new("  ", 9100).is_err());
    }

    #[test]
    fn test_from_station_default_port() {
        let printer = NetworkPrinter::from_station("192.168.0.106", DEFAULT_PORT).unwrap();
        assert_eq!(printer.port(), 9100);
    }

    #[test]
    fn test_from_station_explicit_port() {
        let printer = NetworkPrinter::from_station("127.0.0.1:9200", DEFAULT_PORT).unwrap();
        assert_eq!(printer.port(), 9200);
    }

    #[test]
    fn test_from_station_keeps_host_names_unresolved() {
        let printer = NetworkPrinter::from_station("bar-printer.invalid:9101", DEFAULT_PORT).unwrap();
        assert_eq!(printer.host(), "bar-printer.invalid");
        assert_eq!(printer.port(), 9101);

        let printer = NetworkPrinter::from_station("[::1]:9100", DEFAULT_PORT).unwrap();
        assert_eq!(printer.host(), "::1");
        assert_eq!(printer.address(), "[::1]:9100");
    }

    #[test]
    fn test_invalid_addr() {
        assert!(NetworkPrinter::from_station("", DEFAULT_PORT).is_err());
        assert!(NetworkPrinter::from_station("127.0.0.1:notaport", DEFAULT_PORT).is_err());
    }

    #[tokio::test]
    async fn test_print_delivers_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let reader = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            sock.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let printer = NetworkPrinter::from_station(&addr.to_string(), DEFAULT_PORT).unwrap();
        printer.print(b"\x1b@hello").await.unwrap();

        assert_eq!(reader.await.unwrap(), b"\x1b@hello");
    }

    #[tokio::test]
    async fn test_print_refused_is_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let printer = NetworkPrinter::from_station(&addr.to_string(), DEFAULT_PORT)
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let err = printer.print(b"x").await.unwrap_err();
        assert!(matches!(err, PrintError::Connection { .. } | PrintError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_unresolvable_host_fails_within_timeout() {
        let printer = NetworkPrinter::from_station("bar-printer.invalid", DEFAULT_PORT)
            .unwrap()
            .with_timeout(Duration::from_millis(1500));

        let started = std::time::Instant::now();
        let err = printer.print(b"x").await.unwrap_err();
        assert!(matches!(
            err,
            PrintError::InvalidAddress { .. } | PrintError::Timeout { .. }
        ));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_print_to_host_name() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let reader = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            sock.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let printer = NetworkPrinter::from_station(&format!("localhost:{port}"), DEFAULT_PORT)
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        printer.print(b"ZAKAZ").await.unwrap();

        assert_eq!(reader.await.unwrap(), b"ZAKAZ");
    }
}
