use linerpc_client::ClientBuilder;
use linerpc_core::{BatchOrSingle, Id, Request, Response};
use linerpc_server::{from_fn, ClientId, ServerBuilder};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn echo_handler() -> Box<dyn linerpc_server::Handler> {
    from_fn(|_client: ClientId, messages: &BatchOrSingle<Request>| {
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
    })
}

#[test]
fn scenario_single_call() {
    let mut server = ServerBuilder::new()
        .bind_str("127.0.0.1:0")
        .unwrap()
        .handler(echo_handler())
        .build()
        .unwrap();
    let addr = server.local_addr().unwrap();
    let server_thread = thread::spawn(move || {
        for _ in 0..10 {
            server.step().unwrap();
        }
        server.metrics()
    });

    let mut client = ClientBuilder::new().peer_address(addr).connect().unwrap();
    let request = Request::new("echo", None, Some(1.into())).unwrap();
    let response = client.call(BatchOrSingle::one(request)).unwrap();

    match response {
        BatchOrSingle::One(resp) => {
            assert!(resp.is_success());
            assert_eq!(resp.id(), &Id::Integer(1));
        }
        BatchOrSingle::Many(_) => panic!("expected a single response"),
    }

    let snapshot = server_thread.join().unwrap();
    assert_eq!(snapshot.accepted, 1);
}

#[test]
fn scenario_notification_storm_invokes_handler_without_replying() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let counted = invocations.clone();
    let handler = from_fn(move |_client, messages: &BatchOrSingle<Request>| {
        counted.fetch_add(messages.len(), Ordering::SeqCst);
        None
    });
    let mut server = ServerBuilder::new()
        .bind_str("127.0.0.1:0")
        .unwrap()
        .handler(handler)
        .build()
        .unwrap();
    let addr = server.local_addr().unwrap();
    let server_thread = thread::spawn(move || {
        for _ in 0..50 {
            server.step().unwrap();
        }
    });

    let mut client = ClientBuilder::new().peer_address(addr).connect().unwrap();
    for _ in 0..100 {
        let request = Request::new("log", None, None).unwrap();
        client.notify(BatchOrSingle::one(request)).unwrap();
    }

    // a trailing call proves the socket is still open and the server kept up
    let request = Request::new("ping", None, Some(1.into())).unwrap();
    let response = client.call(BatchOrSingle::one(request)).unwrap();
    assert_eq!(response.len(), 1);

    server_thread.join().unwrap();
    assert_eq!(invocations.load(Ordering::SeqCst), 100);
}

#[test]
fn scenario_batch_mixing_returns_only_requests_with_ids() {
    let mut server = ServerBuilder::new()
        .bind_str("127.0.0.1:0")
        .unwrap()
        .handler(echo_handler())
        .build()
        .unwrap();
    let addr = server.local_addr().unwrap();
    let server_thread = thread::spawn(move || {
        for _ in 0..10 {
            server.step().unwrap();
        }
    });

    let mut client = ClientBuilder::new().peer_address(addr).connect().unwrap();
    let requests = BatchOrSingle::many(vec![
        Request::new("foo", None, Some(1.into())).unwrap(),
        Request::new("bar", None, Some("2".into())).unwrap(),
        Request::new("baz", None, None).unwrap(),
    ]);
    let response = client.call(requests).unwrap();
    assert_eq!(response.len(), 2);

    server_thread.join().unwrap();
}

#[test]
fn scenario_protocol_error_keeps_connection_open() {
    let mut server = ServerBuilder::new()
        .bind_str("127.0.0.1:0")
        .unwrap()
        .handler(echo_handler())
        .build()
        .unwrap();
    let addr = server.local_addr().unwrap();
    let server_thread = thread::spawn(move || {
        for _ in 0..10 {
            server.step().unwrap();
        }
    });

    let mut stream = std::net::TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    use std::io::{Read, Write};
    stream
        .write_all(b"{\"jsonrpc\":\"1.0\",\"method\":\"x\",\"id\":1}\n")
        .unwrap();

    let mut buf = [0u8; 256];
    let n = stream.read(&mut buf).unwrap();
    let line = String::from_utf8_lossy(&buf[..n]);
    assert!(line.contains("\"code\":-32600"));
    assert!(line.contains("\"id\":1"));

    // the connection must still be usable
    stream
        .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":2}\n")
        .unwrap();
    let n = stream.read(&mut buf).unwrap();
    let line = String::from_utf8_lossy(&buf[..n]);
    assert!(line.contains("\"id\":2"));

    server_thread.join().unwrap();
}

#[test]
fn scenario_idle_timeout_frees_the_slot() {
    let mut server = ServerBuilder::new()
        .bind_str("127.0.0.1:0")
        .unwrap()
        .read_timeout_ms(50)
        .handler(echo_handler())
        .build()
        .unwrap();
    let addr = server.local_addr().unwrap();

    let _stream = std::net::TcpStream::connect(addr).unwrap();
    // let accept register the connection
    server.step().unwrap();
    assert_eq!(server.active_clients(), 1);

    thread::sleep(Duration::from_millis(100));
    // the next step observes the expired deadline and half-closes
    server.step().unwrap();

    let snapshot = server.metrics();
    assert_eq!(snapshot.closed_timeout, 1);
    assert_eq!(server.active_clients(), 0);
}
