//! Server builder
//!
//! The builder pattern is the only way to configure a [`Server`]: there are
//! no environment variables and no config files, per the crate's external
//! interface contract. Every field is validated in [`ServerBuilder::build`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use linerpc_server::{ServerBuilder, from_fn, Response};
//!
//! let handler = from_fn(|_client, messages| {
//!     Some(messages.iter()
//!         .filter(|r| !r.is_notification())
//!         .map(|r| Response::success(serde_json::json!(null), r.id.clone().unwrap()))
//!         .collect())
//! });
//!
//! let server = ServerBuilder::new()
//!     .bind("127.0.0.1:0".parse().unwrap())
//!     .max_clients(1024)
//!     .read_timeout_ms(60_000)
//!     .handler(handler)
//!     .build()
//!     .unwrap();
//! ```

use crate::handler::Handler;
use crate::reactor::Server;
use linerpc_core::{Error, Result};
use mio::net::TcpListener;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_MAX_CLIENTS: usize = 1024;
const DEFAULT_READ_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Fluent configuration for a [`Server`].
pub struct ServerBuilder {
    addr: Option<SocketAddr>,
    max_clients: usize,
    read_timeout_ms: u64,
    read_buffer_size: usize,
    handler: Option<Box<dyn Handler>>,
}

impl ServerBuilder {
    /// Start a new builder with the documented defaults: `max_clients =
    /// 1024`, `read_timeout_ms = 60000`, `read_buffer_size = 4096`.
    pub fn new() -> Self {
        Self {
            addr: None,
            max_clients: DEFAULT_MAX_CLIENTS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            handler: None,
        }
    }

    /// Set the address to bind the listening socket to.
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    /// Parse and set the bind address from a string such as
    /// `"127.0.0.1:8080"`.
    pub fn bind_str(mut self, addr: &str) -> Result<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::InvalidRequest(format!("invalid bind address: {e}")))?;
        self.addr = Some(addr);
        Ok(self)
    }

    /// Hard cap on concurrent connections; also sizes the client slot pool.
    pub fn max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = max_clients;
        self
    }

    /// Idle-read timeout, in milliseconds.
    pub fn read_timeout_ms(mut self, millis: u64) -> Self {
        self.read_timeout_ms = millis;
        self
    }

    /// Per-client read buffer capacity, in bytes.
    pub fn read_buffer_size(mut self, bytes: usize) -> Self {
        self.read_buffer_size = bytes;
        self
    }

    /// Register the handler invoked for every drained batch of frames.
    pub fn handler(mut self, handler: Box<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Bind the listening socket and construct the [`Server`].
    pub fn build(self) -> Result<Server> {
        let addr = self
            .addr
            .ok_or_else(|| Error::InvalidRequest("no bind address specified".to_string()))?;
        let handler = self
            .handler
            .ok_or_else(|| Error::InvalidRequest("no handler registered".to_string()))?;

        let listener = TcpListener::bind(addr).map_err(Error::Io)?;
        tracing::info!(addr = %addr, max_clients = self.max_clients, "server listening");

        Server::new(
            listener,
            self.max_clients,
            Duration::from_millis(self.read_timeout_ms),
            self.read_buffer_size,
            handler,
        )
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::from_fn;

    fn noop_handler() -> Box<dyn Handler> {
        from_fn(|_client, _messages| None)
    }

    #[test]
    fn build_requires_bind_address() {
        let result = ServerBuilder::new().handler(noop_handler()).build();
        assert!(result.is_err());
    }

    #[test]
    fn build_requires_handler() {
        let result = ServerBuilder::new().bind_str("127.0.0.1:0").unwrap().build();
        assert!(result.is_err());
    }

    #[test]
    fn build_succeeds_with_address_and_handler() {
        let server = ServerBuilder::new()
            .bind_str("127.0.0.1:0")
            .unwrap()
            .handler(noop_handler())
            .build()
            .unwrap();
        assert!(server.local_addr().is_ok());
    }

    #[test]
    fn bind_str_rejects_garbage() {
        let result = ServerBuilder::new().bind_str("not-an-address");
        assert!(result.is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let builder = ServerBuilder::new();
        assert_eq!(builder.max_clients, DEFAULT_MAX_CLIENTS);
        assert_eq!(builder.read_timeout_ms, DEFAULT_READ_TIMEOUT_MS);
        assert_eq!(builder.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
    }
}
