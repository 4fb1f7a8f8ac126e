//! Client builder
//!
//! The builder pattern is the only way to configure an [`RpcClient`]: there
//! are no environment variables and no config files, mirroring
//! `linerpc-server`'s `ServerBuilder`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use linerpc_client::ClientBuilder;
//!
//! let client = ClientBuilder::new()
//!     .peer_address_str("127.0.0.1:7878")
//!     .unwrap()
//!     .connect()
//!     .unwrap();
//! ```

use crate::client::RpcClient;
use linerpc_core::{Error, Result};
use std::net::{SocketAddr, TcpStream};

const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Fluent configuration for an [`RpcClient`].
pub struct ClientBuilder {
    addr: Option<SocketAddr>,
    read_buffer_size: usize,
}

impl ClientBuilder {
    /// Start a new builder with the documented default: `read_buffer_size
    /// = 4096`.
    pub fn new() -> Self {
        Self {
            addr: None,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    /// Set the peer address to connect to.
    pub fn peer_address(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    /// Parse and set the peer address from a string such as
    /// `"127.0.0.1:7878"`.
    pub fn peer_address_str(mut self, addr: &str) -> Result<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::InvalidRequest(format!("invalid peer address: {e}")))?;
        self.addr = Some(addr);
        Ok(self)
    }

    /// Per-connection read buffer capacity, in bytes.
    pub fn read_buffer_size(mut self, bytes: usize) -> Self {
        self.read_buffer_size = bytes;
        self
    }

    /// Connect to the configured peer and construct the [`RpcClient`].
    pub fn connect(self) -> Result<RpcClient> {
        let addr = self
            .addr
            .ok_or_else(|| Error::InvalidRequest("no peer address specified".to_string()))?;

        let stream = TcpStream::connect(addr).map_err(Error::Io)?;
        stream.set_nodelay(true).map_err(Error::Io)?;
        tracing::info!(addr = %addr, "connected to server");

        Ok(RpcClient::new(stream, self.read_buffer_size))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_peer_address() {
        let result = ClientBuilder::new().connect();
        assert!(result.is_err());
    }

    #[test]
    fn peer_address_str_rejects_garbage() {
        let result = ClientBuilder::new().peer_address_str("not-an-address");
        assert!(result.is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let builder = ClientBuilder::new();
        assert_eq!(builder.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
    }

    #[test]
    fn connect_fails_when_nothing_listens() {
        let result = ClientBuilder::new()
            .peer_address_str("127.0.0.1:1")
            .unwrap()
            .connect();
        assert!(result.is_err());
    }
}
