//! Error taxonomy for linerpc
//!
//! This module defines the closed set of protocol, framing, I/O and resource
//! errors that can occur while parsing, serializing or transporting JSON-RPC
//! 2.0 messages over a line-framed stream.
//!
//! # Error Categories
//!
//! - **Protocol (inbound)**: malformed or invalid JSON-RPC objects.
//! - **Framing**: violations of the line-delimited wire contract itself.
//! - **I/O**: transport-level failures. `WouldBlock` is deliberately not a
//!   variant here — it is an internal non-blocking-read signal handled by
//!   the framed stream readers, never surfaced through this type.
//! - **Resource**: allocator/slot exhaustion in the reactor.
//!
//! # Propagation Policy
//!
//! Per-connection protocol and I/O errors are logged and the connection is
//! closed; they never terminate the reactor. The client surface returns
//! errors verbatim to the caller without retry.

use thiserror::Error;

/// Result type for linerpc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Closed error taxonomy for JSON-RPC object parsing, framing and transport.
#[derive(Debug, Error)]
pub enum Error {
    /// The bytes were not valid JSON at all.
    #[error("invalid JSON: {0}")]
    SyntaxError(#[from] serde_json::Error),

    /// The JSON was valid but not a JSON-RPC 2.0 object (wrong `jsonrpc`
    /// value, or the root was not an object).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// `method` was absent.
    #[error("missing method")]
    MissingMethod,

    /// `method` was present but empty or the wrong JSON type.
    #[error("invalid method: {0}")]
    InvalidMethod(String),

    /// `params` was present but neither an array nor an object.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// `id` was present but not Integer/String/Null (includes non-integer
    /// numbers — floats are rejected, see spec Open Questions).
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// A response was missing its `id` field entirely.
    #[error("missing id")]
    MissingId,

    /// The JSON was an object but matched neither the success nor the
    /// failure shape of a Response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// An `error` object was present without a `code`.
    #[error("missing error code")]
    MissingErrorCode,

    /// An error `code` fell outside `[-32768, -32000]` entirely.
    #[error("invalid error code: {0}")]
    InvalidErrorCode(i64),

    /// An error `code` fell inside the reserved range `[-32768, -32000)`
    /// but outside the server-error band `[-32099, -32000]`.
    #[error("reserved error code: {0}")]
    ReservedErrorCode(i64),

    /// An `error` object was present without a `message`.
    #[error("missing error message")]
    MissingErrorMessage,

    /// An error `message` was present but not a string.
    #[error("invalid error message")]
    InvalidErrorMessage,

    /// An `error` field was present but not a JSON object.
    #[error("invalid error object: {0}")]
    InvalidErrorObject(String),

    /// A batch (LF-delimited sequence of frames) contained zero lines.
    #[error("batch is empty")]
    EmptyInput,

    /// A single line exceeded the read buffer's capacity before a `\n`
    /// was found.
    #[error("line too long for the read buffer")]
    BufferTooSmall,

    /// The peer closed its write half (EOF observed on read).
    #[error("connection closed")]
    Closed,

    /// A client-side blocking call did not receive all expected responses
    /// in time.
    #[error("timed out waiting for a response")]
    Timeout,

    /// A transport-level I/O failure other than would-block.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pool allocator (client slots, timeout nodes) could not satisfy an
    /// allocation.
    #[error("allocator exhausted")]
    OutOfMemory,

    /// The reactor's client slot table is at `max_clients` and rejected a
    /// new connection.
    #[error("slot table full (max_clients reached)")]
    SlotTableFull,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_from_serde() {
        let e = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let err: Error = e.into();
        assert!(matches!(err, Error::SyntaxError(_)));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn display_messages_are_human_readable() {
        assert_eq!(Error::MissingMethod.to_string(), "missing method");
        assert_eq!(Error::Closed.to_string(), "connection closed");
        assert_eq!(
            Error::ReservedErrorCode(-32768).to_string(),
            "reserved error code: -32768"
        );
    }
}
