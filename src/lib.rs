//! Webserver - minimal HTTP/1.0 responder
//!
//! Frames one request head per connection, answers `GET /` with a greeting
//! page and every other path with a 404 page.

pub mod config;
pub mod http;
pub mod server;
