//! Core JSON-RPC 2.0 object model and codec for linerpc
//!
//! This crate provides the foundational types and utilities for implementing
//! JSON-RPC 2.0 communication over a line-framed byte stream. It includes:
//!
//! - **Types**: the JSON-RPC 2.0 object model (`Request`, `Response`,
//!   `ErrorPayload`, `Id`, `Params`, `BatchOrSingle`).
//! - **Codec**: the low-level line-parsing/serializing primitives `types`
//!   builds on.
//! - **Error handling**: a closed error taxonomy covering protocol, framing,
//!   I/O and resource exhaustion.
//!
//! # Architecture
//!
//! The crate is transport-agnostic: it handles message serialization and
//! deserialization but doesn't dictate how bytes reach the wire. The
//! `linerpc-server` and `linerpc-client` crates build on top of this
//! foundation to provide the actual TCP transport.
//!
//! # Example
//!
//! ```rust
//! use linerpc_core::{Request, Response, Id, Frame};
//! use serde_json::json;
//!
//! let request = Request::new("add", None, Some(Id::Integer(1))).unwrap();
//! let line = request.to_line().unwrap();
//! let decoded = Request::from_line(line.trim_end().as_bytes()).unwrap();
//! assert_eq!(decoded.method, "add");
//!
//! let response = Response::success(json!(8), Id::Integer(1));
//! let line = response.to_line().unwrap();
//! assert!(Response::from_line(line.trim_end().as_bytes()).unwrap().is_success());
//! ```

pub mod codec;
pub mod error;
pub mod stream;
pub mod types;

// Re-export the most commonly used types for convenience.
pub use error::{Error, Result};
pub use stream::{DeliveryMode, FramedStream, ReadOutcome, WriteOutcome};
pub use types::{
    BatchOrSingle, ErrorCode, ErrorPayload, Frame, Id, Params, Request, Response,
    JSONRPC_VERSION,
};
