use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use webserver::config::ServerConfig;
use webserver::server::listener::reachable_url;
use webserver::server::{Server, ServerHandle, Stopped};

async fn start_server(max_connections: Option<usize>) -> ServerHandle {
    let cfg = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_connections,
    };
    Server::bind(&cfg).await.unwrap().start().unwrap()
}

async fn request(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    reply
}

#[tokio::test]
async fn test_round_trip_over_tcp() {
    let server = start_server(None).await;

    let reply = request(server.local_addr(), b"GET / HTTP/1.0\r\n\r\n").await;
    assert!(reply.starts_with(b"HTTP/1.0 200 OK"));

    let reply = request(server.local_addr(), b"POST / HTTP/1.0\r\n\r\n").await;
    assert_eq!(reply, b"HTTP/1.0 501 Not Implemented\r\n".to_vec());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_malformed_request_gets_no_bytes() {
    let server = start_server(None).await;

    let reply = request(server.local_addr(), b"GET /\r\n\r\n").await;
    assert!(reply.is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_connections_do_not_interfere() {
    let server = start_server(None).await;
    let addr = server.local_addr();

    // Hold a connection open mid-head; it must not block the others.
    let mut slow = TcpStream::connect(addr).await.unwrap();
    slow.write_all(b"GET /slow HTTP/1.0\r\n").await.unwrap();

    let (ok, missing) = tokio::join!(
        request(addr, b"GET / HTTP/1.0\r\n\r\n"),
        request(addr, b"GET /missing HTTP/1.0\r\n\r\n"),
    );

    assert!(ok.starts_with(b"HTTP/1.0 200 OK"));
    assert!(!String::from_utf8_lossy(&ok).contains("/missing"));

    let missing = String::from_utf8(missing).unwrap();
    assert!(missing.starts_with("HTTP/1.0 404 Not Found"));
    assert!(missing.contains("/missing"));

    slow.write_all(b"\r\n").await.unwrap();
    let mut reply = Vec::new();
    slow.read_to_end(&mut reply).await.unwrap();
    assert!(String::from_utf8(reply).unwrap().contains("/slow is not found"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_bounded_server_still_serves_sequential_clients() {
    let server = start_server(Some(1)).await;

    for _ in 0..3 {
        let reply = request(server.local_addr(), b"GET / HTTP/1.0\r\n\r\n").await;
        assert!(reply.starts_with(b"HTTP/1.0 200 OK"));
    }

    server.stop().await.unwrap();
}

/// Opens a connection that stops mid-head, then returns once the server
/// has accepted it. Accepts are served in order, so a later request being
/// answered means the earlier connection is already in flight.
async fn open_idle_connection(addr: SocketAddr) -> TcpStream {
    let mut idle = TcpStream::connect(addr).await.unwrap();
    idle.write_all(b"GET / HTTP/1.0\r\n").await.unwrap();

    let reply = request(addr, b"GET / HTTP/1.0\r\n\r\n").await;
    assert!(reply.starts_with(b"HTTP/1.0 200 OK"));

    idle
}

#[tokio::test]
async fn test_stop_waits_for_in_flight_connection() {
    let server = start_server(None).await;
    let addr = server.local_addr();

    let mut client = open_idle_connection(addr).await;

    let mut stopping = tokio::spawn(server.stop());
    let still_running = tokio::time::timeout(Duration::from_millis(100), &mut stopping).await;
    assert!(still_running.is_err(), "stop returned with a connection open");

    client.write_all(b"\r\n").await.unwrap();
    let mut reply = Vec::new();
    client.read_to_end(&mut reply).await.unwrap();
    assert!(reply.starts_with(b"HTTP/1.0 200 OK"));

    stopping.await.unwrap().unwrap();
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_stop_or_abort_drains_when_nothing_is_open() {
    let server = start_server(None).await;

    let reply = request(server.local_addr(), b"GET / HTTP/1.0\r\n\r\n").await;
    assert!(reply.starts_with(b"HTTP/1.0 200 OK"));

    let stopped = server
        .stop_or_abort(std::future::pending())
        .await
        .unwrap();
    assert_eq!(stopped, Stopped::Drained);
}

#[tokio::test]
async fn test_stop_or_abort_drops_idle_connection() {
    let server = start_server(None).await;
    let addr = server.local_addr();

    let mut idle = open_idle_connection(addr).await;

    let (tx, rx) = oneshot::channel::<()>();
    let stopping = tokio::spawn(server.stop_or_abort(async move {
        let _ = rx.await;
    }));
    tx.send(()).unwrap();

    assert_eq!(stopping.await.unwrap().unwrap(), Stopped::Aborted);

    // The idle peer sees its connection go away without a response.
    let mut reply = Vec::new();
    let _ = idle.read_to_end(&mut reply).await;
    assert!(reply.is_empty());
    assert!(TcpStream::connect(addr).await.is_err());
}

#[test]
fn test_reachable_url() {
    let url = reachable_url("0.0.0.0:8000".parse().unwrap()).unwrap();
    assert_eq!(url.as_str(), "http://localhost:8000/");

    let url = reachable_url("127.0.0.1:8888".parse().unwrap()).unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:8888/");

    let url = reachable_url("[::1]:8000".parse().unwrap()).unwrap();
    assert_eq!(url.as_str(), "http://[::1]:8000/");
}
