//! Maps a GET path to one of the two fixed pages.
//!
//! Pure and deterministic: no I/O, no state, never fails.

use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::http::writer::serialize_response;

const CONTENT_TYPE: &str = "text/html";

const INDEX_PAGE: &str = "\
<!DOCTYPE html>
<html>
<head><title>Sample</title></head>
<body>This server is implemented with Rust!</body>
</html>
";

// The requested path goes between these two halves.
const NOT_FOUND_BEFORE_PATH: &str = "\
<!DOCTYPE html>
<html>
<head><title>404 Not Found</title></head>
<body>";

const NOT_FOUND_AFTER_PATH: &str = " is not found</body>
</html>
";

/// Builds the response for a GET of `path`.
///
/// `/` yields the greeting page; every other path yields a 404 page that
/// embeds `path` as received, without HTML escaping.
pub fn respond(path: &str) -> Response {
    if path == "/" {
        return page(StatusCode::Ok, crlf(INDEX_PAGE));
    }

    let mut body = crlf(NOT_FOUND_BEFORE_PATH);
    body.push_str(path);
    body.push_str(&crlf(NOT_FOUND_AFTER_PATH));

    page(StatusCode::NotFound, body)
}

/// Same as [`respond`], serialized to wire bytes.
pub fn respond_bytes(path: &str) -> Vec<u8> {
    serialize_response(&respond(path))
}

fn page(status: StatusCode, body: String) -> Response {
    ResponseBuilder::new(status)
        .header("Content-Type", CONTENT_TYPE)
        .body(body.into_bytes())
        .build()
}

/// Templates are written with bare `\n`; the wire wants `\r\n`.
fn crlf(template: &str) -> String {
    template.replace('\n', "\r\n")
}
