use crate::http::request::{Method, RequestHead};

/// Marks the end of a request head.
pub const HEAD_DELIMITER: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No blank line yet; more bytes are needed.
    #[error("request head incomplete")]
    Incomplete,
    #[error("non-ascii byte in request")]
    NonAscii,
    #[error("malformed request line: expected 3 tokens, got {tokens}")]
    MalformedRequestLine { tokens: usize },
}

/// Frames and parses a request head from a complete buffer.
///
/// Anything after the delimiter is ignored, but must still be ASCII.
pub fn parse_request_head(buf: &[u8]) -> Result<RequestHead, ParseError> {
    if !buf.is_ascii() {
        return Err(ParseError::NonAscii);
    }

    let head_end = find_head_end(buf).ok_or(ParseError::Incomplete)?;
    parse_head(&buf[..head_end])
}

/// Parses an already framed head, delimiter excluded.
pub fn parse_head(head: &[u8]) -> Result<RequestHead, ParseError> {
    if !head.is_ascii() {
        return Err(ParseError::NonAscii);
    }
    let head = std::str::from_utf8(head).map_err(|_| ParseError::NonAscii)?;

    let mut lines = head.split("\r\n");

    // split() always yields at least one item
    let request_line = lines.next().unwrap_or_default();
    let tokens: Vec<&str> = request_line.split(' ').collect();

    let [method, path, version] = tokens.as_slice() else {
        return Err(ParseError::MalformedRequestLine {
            tokens: tokens.len(),
        });
    };

    Ok(RequestHead {
        method: Method::from_token(method),
        path: path.to_string(),
        version: version.to_string(),
        header_lines: lines.map(str::to_string).collect(),
    })
}

/// Position of the first blank-line delimiter, if any.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    find_head_end_from(buf, 0)
}

/// Like [`find_head_end`], skipping the first `start` bytes.
///
/// The returned position is still relative to the start of `buf`.
pub fn find_head_end_from(buf: &[u8], start: usize) -> Option<usize> {
    buf.get(start..)?
        .windows(HEAD_DELIMITER.len())
        .position(|w| w == HEAD_DELIMITER)
        .map(|pos| start + pos)
}
