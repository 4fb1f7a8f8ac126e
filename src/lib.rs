//! linerpc - JSON-RPC 2.0 over newline-delimited JSON
//!
//! This is the convenience crate that re-exports the `linerpc-*`
//! sub-crates under one dependency.
//!
//! # Architecture
//!
//! - **linerpc-core**: wire types (`Request`, `Response`, `ErrorPayload`,
//!   `BatchOrSingle`), the JSON Lines codec, and the framed-stream I/O
//!   primitive shared by server and client.
//! - **linerpc-server**: a single-threaded, readiness-driven reactor that
//!   multiplexes many client connections.
//! - **linerpc-client**: a blocking client built on the same framed-stream
//!   primitive.
//!
//! # Quick start - server
//!
//! ```rust,no_run
//! use linerpc::server::{from_fn, ServerBuilder, Response};
//!
//! let handler = from_fn(|_client, messages| {
//!     let responses: Vec<Response> = messages.iter()
//!         .filter(|r| !r.is_notification())
//!         .map(|r| Response::success(serde_json::json!(r.method), r.id.clone().unwrap()))
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
//!
//! # Quick start - client
//!
//! ```rust,no_run
//! use linerpc::client::ClientBuilder;
//! use linerpc::core::{BatchOrSingle, Request};
//!
//! let mut client = ClientBuilder::new()
//!     .peer_address_str("127.0.0.1:7878").unwrap()
//!     .connect()
//!     .unwrap();
//!
//! let request = Request::new("ping", None, Some(1.into())).unwrap();
//! let response = client.call(BatchOrSingle::one(request)).unwrap();
//! println!("{:?}", response);
//! ```

pub use linerpc_client as client;
pub use linerpc_core as core;
pub use linerpc_server as server;

pub use linerpc_client::RpcClient;
pub use linerpc_server::Server;
