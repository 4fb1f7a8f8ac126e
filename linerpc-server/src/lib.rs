//! Single-threaded, readiness-driven JSON-RPC 2.0 server
//!
//! This crate provides the server half of linerpc: a reactor that accepts
//! TCP connections on one listening socket, multiplexes up to `max_clients`
//! of them on a single thread using readiness-based I/O, and translates
//! drained JSON Lines frames into invocations of a user-supplied
//! [`Handler`].
//!
//! # Core properties
//!
//! - **Single-threaded, cooperative.** No user code runs in parallel; the
//!   handler is invoked synchronously from the event loop.
//! - **Non-blocking sockets only.** Every connection, including the
//!   listener, is registered with [`mio`] and never blocks the loop.
//! - **Bounded resources.** `max_clients` both caps concurrency and sizes
//!   the client slot pool ([`slab::Slab`]); the listener is deselected for
//!   read-readiness while the pool is full.
//! - **FIFO idle timeouts.** Each client's deadline sits in a doubly-linked
//!   list ordered by insertion/refresh; a stalled peer is half-closed once
//!   its deadline passes.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use linerpc_server::{ServerBuilder, from_fn, Response};
//! use serde_json::json;
//!
//! let handler = from_fn(|_client, messages| {
//!     let responses: Vec<Response> = messages.iter()
//!         .filter(|r| !r.is_notification())
//!         .map(|r| Response::success(json!(r.method), r.id.clone().unwrap()))
//!         .collect();
//!     if responses.is_empty() { None } else { Some(responses) }
//! });
//!
//! let mut server = ServerBuilder::new()
//!     .bind_str("127.0.0.1:7878").unwrap()
//!     .handler(handler)
//!     .build()
//!     .unwrap();
//!
//! server.run().unwrap();
//! ```

mod builder;
mod handler;
mod metrics;
mod reactor;

pub use builder::ServerBuilder;
pub use handler::{from_fn, ClientId, Handler};
pub use metrics::{MetricsSnapshot, ServerMetrics};
pub use reactor::Server;

pub use linerpc_core::{BatchOrSingle, Error, ErrorPayload, Id, Params, Request, Response, Result};
