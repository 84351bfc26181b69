use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::http::parser::{HEAD_DELIMITER, ParseError, find_head_end_from, parse_head};
use crate::http::request::{Method, RequestHead};
use crate::http::responder;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;

/// Upper bound on a single read from the peer.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Why a connection was abandoned without a response.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("bad request: {0}")]
    Parse(#[from] ParseError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// How a connection ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// One response with this status was written.
    Responded(StatusCode),
    /// The peer hung up before sending a complete request head.
    PeerClosed,
}

pub enum ConnectionState {
    ReadingHead,
    Dispatching(RequestHead),
    Done(StatusCode),
}

/// Serves exactly one request on a stream it owns.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Drives the connection to completion and releases the stream.
    ///
    /// The stream is shut down and dropped on every path, including parse
    /// and I/O failures.
    pub async fn run(mut self) -> Result<Outcome, ConnectionError> {
        let result = self.drive().await;

        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "shutdown after exchange failed");
        }

        result
    }

    async fn drive(&mut self) -> Result<Outcome, ConnectionError> {
        let mut state = ConnectionState::ReadingHead;

        loop {
            state = match state {
                ConnectionState::ReadingHead => match self.read_head().await? {
                    Some(head) => ConnectionState::Dispatching(head),
                    None => {
                        info!("connection closed");
                        return Ok(Outcome::PeerClosed);
                    }
                },

                ConnectionState::Dispatching(head) => {
                    let response = Self::dispatch(&head);

                    let mut writer = ResponseWriter::new(&response);
                    writer.write_to_stream(&mut self.stream).await?;

                    ConnectionState::Done(response.status)
                }

                // No keep-alive: one exchange per connection.
                ConnectionState::Done(status) => return Ok(Outcome::Responded(status)),
            };
        }
    }

    /// Reads until a full request head is framed.
    ///
    /// Returns `Ok(None)` if the peer closes first. Each received byte is
    /// checked and searched a bounded number of times, however long the
    /// head grows.
    pub async fn read_head(&mut self) -> Result<Option<RequestHead>, ConnectionError> {
        loop {
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let n = self.stream.read(&mut chunk).await?;

            if n == 0 {
                return Ok(None);
            }

            let chunk = &chunk[..n];
            if !chunk.is_ascii() {
                debug!("abandoning connection: non-ascii input");
                return Err(ParseError::NonAscii.into());
            }

            // The delimiter may straddle the previous read.
            let search_from = self.buffer.len().saturating_sub(HEAD_DELIMITER.len() - 1);
            self.buffer.extend_from_slice(chunk);

            let Some(head_end) = find_head_end_from(&self.buffer, search_from) else {
                continue;
            };

            let head = parse_head(&self.buffer[..head_end]).inspect_err(|e| {
                debug!(error = %e, "abandoning connection");
            })?;

            debug!(
                method = %head.method,
                path = %head.path,
                version = %head.version,
                headers = head.header_lines.len(),
                "request head received"
            );
            return Ok(Some(head));
        }
    }

    fn dispatch(head: &RequestHead) -> Response {
        match &head.method {
            Method::GET => responder::respond(&head.path),
            Method::Unsupported(method) => {
                info!(method = %method, "unsupported method");
                Response::not_implemented()
            }
        }
    }
}
