//! JSON-RPC 2.0 object model
//!
//! This module implements the data structures described by the JSON-RPC 2.0
//! specification, adapted to the line-framed wire contract this crate uses
//! (see [`crate::Frame`]): `Request`, `Response`, their shared `Id` and
//! `Params`/`ErrorPayload` substructures, and the `BatchOrSingle<T>` batch
//! wrapper.
//!
//! # Parsing strategy
//!
//! Every `from_line` implementation parses the input as a generic
//! `serde_json::Value` first and validates its shape by hand, rather than
//! deriving `Deserialize` directly on `Request`/`Response`. This is what lets
//! a malformed `id` be reported as `InvalidId` and a malformed `method` as
//! `InvalidMethod` instead of collapsing every shape violation into one
//! generic deserialize error.
//!
//! # Ownership
//!
//! A parsed `Request`/`Response` owns every JSON subtree it carries
//! (`params`, `result`, `error.data`) — there is no borrowed state tied to
//! the input buffer, so a parsed value outlives the line it was parsed from.

use crate::codec;
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;

/// The only JSON-RPC version this crate speaks.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request identifier.
///
/// Per spec, an id may be a string, an integer, or null. Floating-point
/// numbers are deliberately rejected (see spec Open Questions) — this is a
/// departure from the bare JSON-RPC spec, which permits any JSON `Number`,
/// made because correlating responses to requests by a lossy float key is
/// rarely what callers want.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Id {
    /// Integer identifier.
    Integer(i64),
    /// String identifier.
    String(String),
    /// Literal JSON `null` — distinct from an absent id, which marks a
    /// notification.
    Null,
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Integer(n) => write!(f, "{n}"),
            Id::String(s) => write!(f, "\"{s}\""),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Integer(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl Id {
    fn to_value(&self) -> Value {
        match self {
            Id::Integer(n) => Value::from(*n),
            Id::String(s) => Value::from(s.clone()),
            Id::Null => Value::Null,
        }
    }

    fn from_value(v: &Value) -> Result<Id> {
        match v {
            Value::Number(n) => n
                .as_i64()
                .map(Id::Integer)
                .ok_or_else(|| Error::InvalidId(format!("non-integer number: {v}"))),
            Value::String(s) => Ok(Id::String(s.clone())),
            Value::Null => Ok(Id::Null),
            other => Err(Error::InvalidId(format!("unexpected id type: {other}"))),
        }
    }
}

/// Structured request parameters: either a positional array or a named
/// object. Absence (no `params` field at all) is represented by
/// `Option<Params>` being `None`, distinct from an explicit empty array.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// `params` was a JSON array.
    Positional(Vec<Value>),
    /// `params` was a JSON object.
    Named(Map<String, Value>),
}

impl Params {
    /// Build positional (array) params.
    pub fn positional(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }

    /// Build named (object) params.
    pub fn named(map: Map<String, Value>) -> Self {
        Params::Named(map)
    }

    fn to_value(&self) -> Value {
        match self {
            Params::Positional(v) => Value::Array(v.clone()),
            Params::Named(m) => Value::Object(m.clone()),
        }
    }

    fn from_value(v: Value) -> Result<Params> {
        match v {
            Value::Array(a) => Ok(Params::Positional(a)),
            Value::Object(o) => Ok(Params::Named(o)),
            other => Err(Error::InvalidParams(format!(
                "expected array or object, got {other}"
            ))),
        }
    }
}

/// Standard and server-defined JSON-RPC error codes.
///
/// The five named constants are the spec-reserved codes; `ServerError`
/// covers the implementation-defined band `[-32099, -32000]`. Any other
/// value in the wider reserved range `[-32768, -32000]` fails to decode
/// (`ReservedErrorCode`); anything outside that range entirely fails as
/// `InvalidErrorCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// -32700: invalid JSON was received.
    ParseError,
    /// -32600: the JSON sent is not a valid Request object.
    InvalidRequest,
    /// -32601: the method does not exist or is not available.
    MethodNotFound,
    /// -32602: invalid method parameters.
    InvalidParams,
    /// -32603: internal JSON-RPC error.
    InternalError,
    /// An implementation-defined server error in `[-32099, -32000]`.
    ServerError(i64),
}

impl ErrorCode {
    /// The wire (integer) value of this code.
    pub fn value(self) -> i64 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::ServerError(n) => n,
        }
    }

    /// Decode a wire integer code, applying the reserved-range rules above.
    pub fn from_value(n: i64) -> Result<ErrorCode> {
        match n {
            -32700 => Ok(ErrorCode::ParseError),
            -32600 => Ok(ErrorCode::InvalidRequest),
            -32601 => Ok(ErrorCode::MethodNotFound),
            -32602 => Ok(ErrorCode::InvalidParams),
            -32603 => Ok(ErrorCode::InternalError),
            -32099..=-32000 => Ok(ErrorCode::ServerError(n)),
            -32768..=-32000 => Err(Error::ReservedErrorCode(n)),
            _ => Err(Error::InvalidErrorCode(n)),
        }
    }
}

/// Wire-format JSON-RPC error object (the `error` field of a `Response`).
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    /// The error kind.
    pub code: ErrorCode,
    /// Short human-readable description.
    pub message: String,
    /// Optional additional structured context.
    pub data: Option<Value>,
}

impl ErrorPayload {
    /// Construct an error payload with no `data`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Construct an error payload carrying additional `data`.
    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// -32700 Parse error.
    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, "Parse error")
    }

    /// -32600 Invalid Request.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, msg)
    }

    /// -32601 Method not found.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method not found: {}", method.into()),
        )
    }

    /// -32602 Invalid params.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, msg)
    }

    /// -32603 Internal error.
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, msg)
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("code".to_string(), Value::from(self.code.value()));
        map.insert("message".to_string(), Value::from(self.message.clone()));
        if let Some(data) = &self.data {
            map.insert("data".to_string(), data.clone());
        }
        Value::Object(map)
    }

    fn from_value(v: &Value) -> Result<ErrorPayload> {
        let obj = v
            .as_object()
            .ok_or_else(|| Error::InvalidErrorObject(format!("{v}")))?;
        let code_n = obj
            .get("code")
            .ok_or(Error::MissingErrorCode)?
            .as_i64()
            .ok_or_else(|| Error::InvalidErrorObject("code must be an integer".to_string()))?;
        let code = ErrorCode::from_value(code_n)?;
        let message = obj
            .get("message")
            .ok_or(Error::MissingErrorMessage)?
            .as_str()
            .ok_or(Error::InvalidErrorMessage)?
            .to_string();
        let data = obj.get("data").cloned();
        Ok(ErrorPayload {
            code,
            message,
            data,
        })
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.value(), self.message)
    }
}

impl std::error::Error for ErrorPayload {}

/// A trait for JSON-RPC objects that can be read from and written to a
/// single JSON Lines frame.
///
/// This generalizes the compile-time predicate the original implementation
/// used to restrict a container to `Request` or `Response`: any type that
/// can parse itself from one line and serialize itself back to one
/// LF-terminated line qualifies, with no runtime type introspection
/// involved.
pub trait Frame: Sized {
    /// Parse one frame (a single JSON document; a trailing `\n` is
    /// optional).
    fn from_line(bytes: &[u8]) -> Result<Self>;

    /// Serialize to a compact JSON object followed by exactly one `\n`.
    fn to_line(&self) -> Result<String>;
}

/// A JSON-RPC 2.0 request or notification.
///
/// `id` distinguishes the two: `is_notification()` is true exactly when
/// `id` is absent. `id: Some(Id::Null)` is a request, not a notification —
/// implementers must not conflate these.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// The method name to invoke. Never empty.
    pub method: String,
    /// Optional structured parameters.
    pub params: Option<Params>,
    /// Present for requests, absent for notifications.
    pub id: Option<Id>,
}

impl Request {
    /// Construct and validate a request.
    ///
    /// Fails with `InvalidMethod` if `method` is empty. `id` and `params`
    /// are taken as already-validated `Option<Id>`/`Option<Params>`, so
    /// there is nothing further to check here — the type system rules out
    /// the wire-level invalid shapes (float ids, scalar params) before this
    /// point.
    pub fn new(
        method: impl Into<String>,
        params: Option<Params>,
        id: Option<Id>,
    ) -> Result<Request> {
        let method = method.into();
        if method.is_empty() {
            return Err(Error::InvalidMethod("method must not be empty".to_string()));
        }
        Ok(Request { method, params, id })
    }

    /// True when this request carries no `id` — the server owes no
    /// response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("jsonrpc".to_string(), Value::from(JSONRPC_VERSION));
        map.insert("method".to_string(), Value::from(self.method.clone()));
        if let Some(params) = &self.params {
            map.insert("params".to_string(), params.to_value());
        }
        if let Some(id) = &self.id {
            map.insert("id".to_string(), id.to_value());
        }
        Value::Object(map)
    }

    fn from_value(value: Value) -> Result<Request> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::InvalidRequest("root is not an object".to_string()))?;

        match obj.get("jsonrpc") {
            Some(Value::String(v)) if v == JSONRPC_VERSION => {}
            Some(other) => {
                return Err(Error::InvalidRequest(format!(
                    "unsupported jsonrpc version: {other}"
                )))
            }
            None => return Err(Error::InvalidRequest("missing jsonrpc field".to_string())),
        }

        let method = match obj.get("method") {
            None => return Err(Error::MissingMethod),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(other) => return Err(Error::InvalidMethod(format!("{other}"))),
        };

        let params = match obj.get("params") {
            None => None,
            Some(v) => Some(Params::from_value(v.clone())?),
        };

        let id = match obj.get("id") {
            None => None,
            Some(v) => Some(Id::from_value(v)?),
        };

        Ok(Request { method, params, id })
    }
}

impl Frame for Request {
    fn from_line(bytes: &[u8]) -> Result<Self> {
        Request::from_value(codec::parse_value(bytes)?)
    }

    fn to_line(&self) -> Result<String> {
        codec::write_value(&self.to_value())
    }
}

/// A JSON-RPC 2.0 response: either a success carrying a `result`, or a
/// failure carrying an `error`. Never both, never neither.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A successful result, with the id of the request it answers.
    Success {
        /// The result value, which may itself be `null`.
        result: Value,
        /// Always Integer or String — a successful response never carries
        /// a null id.
        id: Id,
    },
    /// An error, with the id of the request it answers (or `Id::Null` if
    /// the request's id could not be determined).
    Failure {
        /// The error details.
        error: ErrorPayload,
        /// The correlating id, or `Id::Null` when unparseable.
        id: Id,
    },
}

impl Response {
    /// Build a success response.
    pub fn success(result: Value, id: Id) -> Self {
        Response::Success { result, id }
    }

    /// Build a failure response.
    pub fn error(error: ErrorPayload, id: Id) -> Self {
        Response::Failure { error, id }
    }

    /// The id carried by this response, in either variant.
    pub fn id(&self) -> &Id {
        match self {
            Response::Success { id, .. } | Response::Failure { id, .. } => id,
        }
    }

    /// True for the `Success` variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// True for the `Failure` variant.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Failure { .. })
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("jsonrpc".to_string(), Value::from(JSONRPC_VERSION));
        match self {
            Response::Success { result, id } => {
                map.insert("result".to_string(), result.clone());
                map.insert("id".to_string(), id.to_value());
            }
            Response::Failure { error, id } => {
                map.insert("error".to_string(), error.to_value());
                map.insert("id".to_string(), id.to_value());
            }
        }
        Value::Object(map)
    }

    fn from_value(value: Value) -> Result<Response> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::InvalidResponse("root is not an object".to_string()))?;

        if let Some(error_v) = obj.get("error") {
            let error = ErrorPayload::from_value(error_v)?;
            let id = match obj.get("id") {
                Some(v) => Id::from_value(v)?,
                None => return Err(Error::MissingId),
            };
            return Ok(Response::Failure { error, id });
        }

        let result = obj
            .get("result")
            .cloned()
            .ok_or_else(|| Error::InvalidResponse("missing result".to_string()))?;
        let id = match obj.get("id") {
            None => return Err(Error::MissingId),
            Some(Value::Null) => {
                return Err(Error::InvalidId(
                    "a success response must not carry a null id".to_string(),
                ))
            }
            Some(v) => Id::from_value(v)?,
        };
        Ok(Response::Success { result, id })
    }
}

impl Frame for Response {
    fn from_line(bytes: &[u8]) -> Result<Self> {
        Response::from_value(codec::parse_value(bytes)?)
    }

    fn to_line(&self) -> Result<String> {
        codec::write_value(&self.to_value())
    }
}

/// A single frame, or two-or-more frames treated as a unit.
///
/// On the wire a batch is **not** a JSON array (a deliberate departure from
/// the bare JSON-RPC 2.0 spec — see the crate-level design notes): it is
/// simply multiple LF-delimited frames concatenated in one read segment.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOrSingle<T> {
    /// Exactly one element.
    One(T),
    /// Two or more elements, in wire order.
    Many(Vec<T>),
}

impl<T> BatchOrSingle<T> {
    /// Wrap a single element.
    pub fn one(item: T) -> Self {
        BatchOrSingle::One(item)
    }

    /// Wrap two or more elements. Does not enforce `len() >= 2` — callers
    /// constructing a batch programmatically are trusted to pass a
    /// multi-element `Vec`; parsing always produces the right variant.
    pub fn many(items: Vec<T>) -> Self {
        BatchOrSingle::Many(items)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            BatchOrSingle::One(_) => 1,
            BatchOrSingle::Many(v) => v.len(),
        }
    }

    /// A `BatchOrSingle` is never empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Borrow element `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// View the elements as a slice, regardless of variant.
    pub fn as_slice(&self) -> &[T] {
        match self {
            BatchOrSingle::One(t) => std::slice::from_ref(t),
            BatchOrSingle::Many(v) => v.as_slice(),
        }
    }

    /// Iterate over elements by reference.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Frame> BatchOrSingle<T> {
    /// Parse a batch from a read segment: split on `\n`, parse each
    /// non-empty line, and collect. Zero lines is `EmptyInput`; one line is
    /// `One`; two or more is `Many`.
    pub fn from_lines(bytes: &[u8]) -> Result<Self> {
        let mut items = Vec::new();
        for line in codec::split_lines(bytes) {
            items.push(T::from_line(line)?);
        }
        match items.len() {
            0 => Err(Error::EmptyInput),
            1 => Ok(BatchOrSingle::One(items.into_iter().next().expect("len == 1"))),
            _ => Ok(BatchOrSingle::Many(items)),
        }
    }

    /// Serialize every element as its own LF-terminated line, concatenated
    /// with no additional separator.
    pub fn to_lines(&self) -> Result<String> {
        let mut out = String::new();
        for item in self.as_slice() {
            out.push_str(&item.to_line()?);
        }
        Ok(out)
    }
}
