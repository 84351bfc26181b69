//! Transport listener
//!
//! Binds the TCP port and hands each accepted connection to its own
//! [`crate::http::connection::Connection`] task.

pub mod listener;

pub use listener::{Server, ServerHandle, Stopped};
