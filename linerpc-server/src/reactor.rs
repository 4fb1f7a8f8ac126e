//! The single-threaded server reactor
//!
//! `Server` owns one listening socket, a bounded pool of client slots, and a
//! FIFO idle-timeout list. It is strictly single-threaded and cooperative:
//! [`Handler::handle`](crate::Handler::handle) runs synchronously from
//! inside [`Server::step`], and while it runs no other client is served.
//!
//! # Per-client state machine
//!
//! | State | on READ ready | on WRITE ready | on timeout |
//! |---|---|---|---|
//! | `ReadingReq` | drain frames, invoke handler, transition | — | shutdown(recv), remove once drained |
//! | `WritingResp` | — | resume vectored write; drained → `ReadingReq` | shutdown(recv), remove once write drains |

use crate::handler::{ClientId, Handler};
use crate::metrics::{MetricsSnapshot, ServerMetrics};
use linerpc_core::codec;
use linerpc_core::{
    BatchOrSingle, DeliveryMode, Error, ErrorPayload, Frame, FramedStream, Id, ReadOutcome,
    Request, Response, Result, WriteOutcome,
};
use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token};
use slab::Slab;
use std::io;
use std::net::{Shutdown, SocketAddr};
use std::time::{Duration, Instant};

const LISTENER_TOKEN: Token = Token(usize::MAX);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClientState {
    ReadingReq,
    WritingResp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Timeout,
    PeerClosed,
    ProtocolError,
}

struct Client {
    stream: FramedStream<TcpStream>,
    state: ClientState,
    deadline: Instant,
    timeout_linked: bool,
    timeout_prev: Option<usize>,
    timeout_next: Option<usize>,
    /// Set once an idle timeout has half-closed this client's read side;
    /// a write still in flight is allowed to drain before the slot is
    /// actually freed.
    closing: bool,
}

/// The single-threaded, readiness-driven JSON-RPC 2.0 server.
///
/// Constructed via [`crate::ServerBuilder`], never directly.
pub struct Server {
    listener: TcpListener,
    listener_registered: bool,
    poll: Poll,
    events: Events,
    clients: Slab<Client>,
    timeout_head: Option<usize>,
    timeout_tail: Option<usize>,
    max_clients: usize,
    read_timeout: Duration,
    read_buffer_size: usize,
    handler: Box<dyn Handler>,
    metrics: ServerMetrics,
}

impl Server {
    pub(crate) fn new(
        mut listener: TcpListener,
        max_clients: usize,
        read_timeout: Duration,
        read_buffer_size: usize,
        handler: Box<dyn Handler>,
    ) -> Result<Self> {
        let poll = Poll::new().map_err(Error::Io)?;
        poll.registry()
            .register(&mut listener, LISTENER_TOKEN, Interest::READABLE)
            .map_err(Error::Io)?;
        Ok(Self {
            listener,
            listener_registered: true,
            poll,
            events: Events::with_capacity(1024),
            clients: Slab::with_capacity(max_clients),
            timeout_head: None,
            timeout_tail: None,
            max_clients,
            read_timeout,
            read_buffer_size,
            handler,
            metrics: ServerMetrics::new(),
        })
    }

    /// The address the listening socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(Error::Io)
    }

    /// A point-in-time snapshot of server counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of currently open connections.
    pub fn active_clients(&self) -> usize {
        self.clients.len()
    }

    /// Run the reactor until the listening socket itself fails. Individual
    /// client errors never escape this loop; they close that one
    /// connection.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.step()?;
        }
    }

    /// Perform exactly one readiness wait and process whatever events it
    /// yields, including idle-timeout expiry. Exposed so tests and
    /// embedders can drive the reactor one tick at a time instead of
    /// blocking forever.
    pub fn step(&mut self) -> Result<()> {
        let timeout = self.next_timeout();
        self.poll.poll(&mut self.events, timeout).map_err(Error::Io)?;

        let ready: Vec<(Token, bool, bool)> = self
            .events
            .iter()
            .map(|e| (e.token(), e.is_readable(), e.is_writable()))
            .collect();

        for (token, readable, writable) in ready {
            if token == LISTENER_TOKEN {
                if readable {
                    self.accept_new_clients();
                }
                continue;
            }
            let key = token.0;
            if !self.clients.contains(key) {
                continue;
            }
            if readable {
                self.on_readable(key);
            }
            if self.clients.contains(key) && writable {
                self.on_writable(key);
            }
        }

        self.expire_timeouts();
        Ok(())
    }

    fn next_timeout(&self) -> Option<Duration> {
        let key = self.timeout_head?;
        let now = Instant::now();
        Some(self.clients[key].deadline.saturating_duration_since(now))
    }

    fn accept_new_clients(&mut self) {
        loop {
            if self.clients.len() >= self.max_clients {
                self.deregister_listener();
                return;
            }
            match self.listener.accept() {
                Ok((stream, addr)) => self.register_client(stream, addr),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    return;
                }
            }
        }
    }

    fn deregister_listener(&mut self) {
        if self.listener_registered {
            let _ = self.poll.registry().deregister(&mut self.listener);
            self.listener_registered = false;
            tracing::debug!("slot table full, listener deselected");
        }
    }

    fn reregister_listener_if_needed(&mut self) {
        if !self.listener_registered {
            if self
                .poll
                .registry()
                .register(&mut self.listener, LISTENER_TOKEN, Interest::READABLE)
                .is_ok()
            {
                self.listener_registered = true;
                tracing::debug!("slot freed, listener reselected");
            }
        }
    }

    fn register_client(&mut self, mut stream: TcpStream, addr: SocketAddr) {
        let deadline = Instant::now() + self.read_timeout;
        let entry = self.clients.vacant_entry();
        let key = entry.key();
        let token = Token(key);
        if let Err(e) = self
            .poll
            .registry()
            .register(&mut stream, token, Interest::READABLE)
        {
            tracing::warn!(error = %e, addr = %addr, "failed to register client");
            return;
        }
        let framed = FramedStream::new(stream, self.read_buffer_size, DeliveryMode::Drain);
        entry.insert(Client {
            stream: framed,
            state: ClientState::ReadingReq,
            deadline,
            timeout_linked: false,
            timeout_prev: None,
            timeout_next: None,
            closing: false,
        });
        self.timeout_push_back(key);
        self.metrics.record_accept();
        tracing::debug!(client = key, addr = %addr, "accepted connection");
    }

    fn on_readable(&mut self, key: usize) {
        let outcome = self.clients[key].stream.read_frames();
        match outcome {
            Ok(ReadOutcome::Closed) => {
                tracing::debug!(client = key, "peer closed connection");
                self.finish_close(key, CloseReason::PeerClosed);
            }
            Ok(ReadOutcome::Frames(frames)) if frames.is_empty() => {
                // Read would have blocked; no progress, no deadline refresh.
            }
            Ok(ReadOutcome::Frames(frames)) => {
                let bytes: u64 = frames.iter().map(|f| f.len() as u64 + 1).sum();
                self.metrics.record_read(bytes);
                self.timeout_refresh(key);
                self.process_frames(key, frames);
            }
            Err(e) => {
                tracing::warn!(client = key, error = %e, "read error");
                self.finish_close(key, CloseReason::ProtocolError);
            }
        }
    }

    fn process_frames(&mut self, key: usize, frames: Vec<Vec<u8>>) {
        let mut requests = Vec::new();
        let mut responses = Vec::new();

        for line in &frames {
            match Request::from_line(line) {
                Ok(req) => requests.push(req),
                Err(err) => {
                    let id = salvage_id(line);
                    let payload = match &err {
                        Error::SyntaxError(_) => ErrorPayload::parse_error(),
                        _ => ErrorPayload::invalid_request(err.to_string()),
                    };
                    tracing::debug!(client = key, error = %err, "rejecting malformed frame");
                    responses.push(Response::error(payload, id));
                }
            }
        }

        if !requests.is_empty() {
            let batch = if requests.len() == 1 {
                BatchOrSingle::one(requests.into_iter().next().expect("len == 1"))
            } else {
                BatchOrSingle::many(requests)
            };
            if let Some(mut handler_responses) = self.handler.handle(ClientId(key), &batch) {
                responses.append(&mut handler_responses);
            }
        }

        if responses.is_empty() {
            return;
        }
        self.send_responses(key, responses);
    }

    fn send_responses(&mut self, key: usize, responses: Vec<Response>) {
        let mut lines = Vec::with_capacity(responses.len());
        for response in &responses {
            match response.to_line() {
                Ok(line) => lines.push(line),
                Err(e) => {
                    tracing::warn!(client = key, error = %e, "failed to serialize response");
                    self.finish_close(key, CloseReason::ProtocolError);
                    return;
                }
            }
        }
        let total_bytes: u64 = lines.iter().map(|l| l.len() as u64).sum();

        let client = &mut self.clients[key];
        client.stream.queue_frames(lines);
        match client.stream.write_pending() {
            Ok(WriteOutcome::Complete) => {
                self.metrics.record_written(total_bytes);
                if self.clients[key].closing {
                    self.finish_close(key, CloseReason::Timeout);
                }
            }
            Ok(WriteOutcome::Pending) => {
                self.clients[key].state = ClientState::WritingResp;
                self.reregister_client(key, Interest::WRITABLE);
            }
            Err(e) => {
                tracing::warn!(client = key, error = %e, "write error");
                self.finish_close(key, CloseReason::ProtocolError);
            }
        }
    }

    fn on_writable(&mut self, key: usize) {
        match self.clients[key].stream.write_pending() {
            Ok(WriteOutcome::Complete) => {
                if self.clients[key].closing {
                    self.finish_close(key, CloseReason::Timeout);
                    return;
                }
                self.clients[key].state = ClientState::ReadingReq;
                self.reregister_client(key, Interest::READABLE);
            }
            Ok(WriteOutcome::Pending) => {}
            Err(e) => {
                tracing::warn!(client = key, error = %e, "write error");
                self.finish_close(key, CloseReason::ProtocolError);
            }
        }
    }

    fn reregister_client(&mut self, key: usize, interest: Interest) {
        let token = Token(key);
        let client = &mut self.clients[key];
        if let Err(e) = self.poll.registry().reregister(client.stream.get_mut(), token, interest) {
            tracing::warn!(client = key, error = %e, "reregister failed");
            self.finish_close(key, CloseReason::ProtocolError);
        }
    }

    fn expire_timeouts(&mut self) {
        let now = Instant::now();
        let mut expired = Vec::new();
        while let Some(key) = self.timeout_head {
            if self.clients[key].deadline > now {
                break;
            }
            self.timeout_remove(key);
            expired.push(key);
        }
        for key in expired {
            if !self.clients.contains(key) {
                continue;
            }
            tracing::info!(client = key, "idle timeout, half-closing read side");
            let _ = self.clients[key].stream.get_mut().shutdown(Shutdown::Read);
            self.clients[key].closing = true;
            if self.clients[key].state == ClientState::ReadingReq {
                self.finish_close(key, CloseReason::Timeout);
            }
        }
    }

    fn finish_close(&mut self, key: usize, reason: CloseReason) {
        if !self.clients.contains(key) {
            return;
        }
        self.timeout_remove(key);
        let client = self.clients.remove(key);
        let mut stream = client.stream;
        let _ = self.poll.registry().deregister(stream.get_mut());
        match reason {
            CloseReason::Timeout => self.metrics.record_closed_timeout(),
            CloseReason::PeerClosed => self.metrics.record_closed_peer(),
            CloseReason::ProtocolError => self.metrics.record_closed_error(),
        }
        self.reregister_listener_if_needed();
    }

    fn timeout_push_back(&mut self, key: usize) {
        self.clients[key].timeout_linked = true;
        self.clients[key].timeout_prev = self.timeout_tail;
        self.clients[key].timeout_next = None;
        match self.timeout_tail {
            Some(tail) => self.clients[tail].timeout_next = Some(key),
            None => self.timeout_head = Some(key),
        }
        self.timeout_tail = Some(key);
    }

    fn timeout_remove(&mut self, key: usize) {
        if !self.clients[key].timeout_linked {
            return;
        }
        let prev = self.clients[key].timeout_prev;
        let next = self.clients[key].timeout_next;
        match prev {
            Some(p) => self.clients[p].timeout_next = next,
            None => self.timeout_head = next,
        }
        match next {
            Some(n) => self.clients[n].timeout_prev = prev,
            None => self.timeout_tail = prev,
        }
        self.clients[key].timeout_linked = false;
        self.clients[key].timeout_prev = None;
        self.clients[key].timeout_next = None;
    }

    fn timeout_refresh(&mut self, key: usize) {
        self.timeout_remove(key);
        self.clients[key].deadline = Instant::now() + self.read_timeout;
        self.timeout_push_back(key);
    }
}

/// Best-effort extraction of a request id from an otherwise-unparseable
/// frame, so the error response sent back can still correlate to the
/// caller's request when possible.
fn salvage_id(line: &[u8]) -> Id {
    codec::parse_value(line)
        .ok()
        .and_then(|v| v.get("id").cloned())
        .and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_i64().map(Id::Integer),
            serde_json::Value::String(s) => Some(Id::String(s)),
            _ => None,
        })
        .unwrap_or(Id::Null)
}
