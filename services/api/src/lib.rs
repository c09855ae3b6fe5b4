//! Casa API Library Crate
//!
//! This library contains the web service around the interpretation pipeline:
//! configuration, application state, HTTP handlers, the executor gateway and
//! routing. The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;
