//! The handler contract
//!
//! A handler is the user-supplied callback the reactor invokes once per
//! readiness event, synchronously, with every frame drained from that
//! event. It is the one piece of the system explicitly out of scope of this
//! crate — but its shape is part of the contract the reactor depends on.
//!
//! # Why synchronous?
//!
//! The reactor is single-threaded and cooperative: while a handler runs, no
//! other client is served. Handlers are expected to be bounded and
//! non-blocking; there is no async executor here to suspend into.

use linerpc_core::{BatchOrSingle, Request, Response};

/// Identifies which connection a handler invocation is for.
///
/// Carries no lifetime tied to the connection itself — it is a stable slot
/// index, valid only for the duration of the call that produced it (the
/// slot may be reused for a different peer after that connection closes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub usize);

/// The interface every JSON-RPC method implementation satisfies.
///
/// `handle` receives every complete frame drained from one readiness event
/// (a single request, or a batch) and returns the responses owed, if any.
/// Returning `None` means every input was a notification; returning
/// `Some(vec)` yields one outgoing frame per element of `vec`, written by
/// the reactor in the order returned.
///
/// Any panic inside `handle` is not caught by the reactor — a handler that
/// cannot bound its own failures should return error `Response`s instead of
/// panicking.
pub trait Handler: Send + Sync {
    /// Process a batch of frames for one client and return the responses to
    /// send back, if any.
    fn handle(&self, client: ClientId, messages: &BatchOrSingle<Request>) -> Option<Vec<Response>>;
}

impl<F> Handler for F
where
    F: Fn(ClientId, &BatchOrSingle<Request>) -> Option<Vec<Response>> + Send + Sync,
{
    fn handle(&self, client: ClientId, messages: &BatchOrSingle<Request>) -> Option<Vec<Response>> {
        self(client, messages)
    }
}

/// Wrap a plain function or closure as a boxed [`Handler`].
pub fn from_fn<F>(f: F) -> Box<dyn Handler>
where
    F: Fn(ClientId, &BatchOrSingle<Request>) -> Option<Vec<Response>> + Send + Sync + 'static,
{
    Box::new(f)
}
