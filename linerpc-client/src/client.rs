//! Blocking JSON-RPC client
//!
//! [`RpcClient`] wraps a connected [`TcpStream`] in the same
//! [`FramedStream`] the server uses, but in [`DeliveryMode::Single`] and
//! over a socket left in its default blocking mode. `read_frames` and
//! `write_pending` therefore block at the OS level instead of returning
//! `WouldBlock` — there is no reactor here, just one call in, one response
//! out.

use linerpc_core::{
    BatchOrSingle, DeliveryMode, Error, Frame, FramedStream, ReadOutcome, Request, Response,
    Result, WriteOutcome,
};
use std::net::{SocketAddr, TcpStream};

/// A connected client for one peer. Not `Clone`; each instance owns its
/// socket and read/write buffers.
pub struct RpcClient {
    stream: FramedStream<TcpStream>,
}

impl RpcClient {
    pub(crate) fn new(stream: TcpStream, read_buffer_size: usize) -> Self {
        Self {
            stream: FramedStream::new(stream, read_buffer_size, DeliveryMode::Single),
        }
    }

    /// Send one or more requests and block until a response has arrived
    /// for every request that carried an id. Pure notifications in the
    /// batch produce no response and are not waited on.
    ///
    /// Returns [`Error::InvalidRequest`] if the batch contains no request
    /// with an id — use [`RpcClient::notify`] for notification-only
    /// batches.
    pub fn call(&mut self, requests: BatchOrSingle<Request>) -> Result<BatchOrSingle<Response>> {
        let expected = requests.iter().filter(|r| !r.is_notification()).count();
        if expected == 0 {
            return Err(Error::InvalidRequest(
                "call() requires at least one request with an id; use notify() for \
                 notification-only batches"
                    .to_string(),
            ));
        }

        self.write_batch(&requests)?;

        let mut responses = Vec::with_capacity(expected);
        while responses.len() < expected {
            match self.stream.read_frames()? {
                ReadOutcome::Closed => return Err(Error::Closed),
                ReadOutcome::Frames(lines) => {
                    for line in lines {
                        responses.push(Response::from_line(&line)?);
                    }
                }
            }
        }

        Ok(if responses.len() == 1 {
            BatchOrSingle::one(responses.into_iter().next().unwrap())
        } else {
            BatchOrSingle::many(responses)
        })
    }

    /// Send one or more notifications. Does not wait for a response, since
    /// notifications have none.
    pub fn notify(&mut self, requests: BatchOrSingle<Request>) -> Result<()> {
        self.write_batch(&requests)
    }

    fn write_batch(&mut self, requests: &BatchOrSingle<Request>) -> Result<()> {
        let lines = requests
            .iter()
            .map(Frame::to_line)
            .collect::<Result<Vec<_>>>()?;
        self.stream.queue_frames(lines);
        loop {
            match self.stream.write_pending()? {
                WriteOutcome::Complete => return Ok(()),
                WriteOutcome::Pending => continue,
            }
        }
    }

    /// The remote address this client is connected to.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.stream.get_ref().peer_addr().map_err(Error::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientBuilder;
    use linerpc_server::{from_fn, ServerBuilder};
    use serde_json::json;
    use std::thread;

    fn echo_server() -> (linerpc_server::Server, SocketAddr) {
        let handler = from_fn(|_client, messages: &BatchOrSingle<Request>| {
            let responses: Vec<Response> = messages
                .iter()
                .filter(|r| !r.is_notification())
                .map(|r| Response::success(json!(r.method), r.id.clone().unwrap()))
                .collect();
            if responses.is_empty() {
                None
            } else {
                Some(responses)
            }
        });
        let server = ServerBuilder::new()
            .bind_str("127.0.0.1:0")
            .unwrap()
            .handler(handler)
            .build()
            .unwrap();
        let addr = server.local_addr().unwrap();
        (server, addr)
    }

    #[test]
    fn single_call_round_trip() {
        let (mut server, addr) = echo_server();
        let server_thread = thread::spawn(move || {
            for _ in 0..10 {
                server.step().unwrap();
            }
        });

        let mut client = ClientBuilder::new().peer_address(addr).connect().unwrap();
        let request = Request::new("ping", None, Some(1.into())).unwrap();
        let response = client.call(BatchOrSingle::one(request)).unwrap();
        assert_eq!(response.len(), 1);
        assert!(response.get(0).unwrap().is_success());

        server_thread.join().unwrap();
    }

    #[test]
    fn notify_does_not_block_waiting_for_a_response() {
        let (mut server, addr) = echo_server();
        let server_thread = thread::spawn(move || {
            for _ in 0..10 {
                server.step().unwrap();
            }
        });

        let mut client = ClientBuilder::new().peer_address(addr).connect().unwrap();
        let request = Request::new("log", None, None).unwrap();
        client.notify(BatchOrSingle::one(request)).unwrap();

        server_thread.join().unwrap();
    }

    #[test]
    fn call_rejects_pure_notification_batch() {
        let (mut server, addr) = echo_server();
        let server_thread = thread::spawn(move || {
            let _ = server.step();
        });

        let mut client = ClientBuilder::new().peer_address(addr).connect().unwrap();
        let request = Request::new("log", None, None).unwrap();
        let result = client.call(BatchOrSingle::one(request));
        assert!(result.is_err());

        server_thread.join().unwrap();
    }
}
