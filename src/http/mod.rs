//! HTTP/1.0 protocol implementation.
//!
//! Serves exactly one request per connection, then closes it.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection state machine, owns the stream
//! - **`parser`**: frames the request head and parses the request line
//! - **`request`**: the parsed request head
//! - **`responder`**: maps a GET path to the greeting or 404 page
//! - **`response`**: response representation with builder pattern
//! - **`writer`**: serializes and writes responses
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │ ReadingHead │ ← accumulate until "\r\n\r\n"
//!        └──────┬──────┘
//!               │ head framed             (peer EOF, non-ascii or
//!               ▼                          bad request line → close)
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← GET → responder, else 501
//!        └──────┬───────────┘
//!               │ response written
//!               ▼
//!        ┌──────────────────┐
//!        │      Done        │ ← stream shut down and dropped
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use webserver::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8000").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         tokio::spawn(async move {
//!             if let Err(e) = Connection::new(socket).run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod responder;
pub mod response;
pub mod writer;
