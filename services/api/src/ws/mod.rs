//! Executor Gateway over WebSockets
//!
//! Device executors connect here to receive the directives produced by the
//! interpretation pipeline.
//!
//! - `protocol`: Defines the JSON message format pushed to executors.
//! - `session`: Manages one executor connection from handshake to close.

pub mod protocol;
pub mod session;

pub use session::ws_handler;
