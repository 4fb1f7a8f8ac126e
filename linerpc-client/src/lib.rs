//! Blocking JSON-RPC 2.0 client over a line-framed TCP stream
//!
//! Pairs with `linerpc-server`: one call in, one response out, no
//! reconnection and no background tasks. Connect, then use
//! [`RpcClient::call`] for requests that expect a response or
//! [`RpcClient::notify`] for notifications.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use linerpc_client::ClientBuilder;
//! use linerpc_core::{BatchOrSingle, Request};
//!
//! let mut client = ClientBuilder::new()
//!     .peer_address_str("127.0.0.1:7878")
//!     .unwrap()
//!     .connect()
//!     .unwrap();
//!
//! let request = Request::new("ping", None, Some(1.into())).unwrap();
//! let response = client.call(BatchOrSingle::one(request)).unwrap();
//! println!("{:?}", response);
//! ```

mod client;
mod client_builder;

pub use client::RpcClient;
pub use client_builder::ClientBuilder;

pub use linerpc_core::{BatchOrSingle, Error, ErrorPayload, Id, Params, Request, Response, Result};
