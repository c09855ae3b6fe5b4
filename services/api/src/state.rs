//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the resources shared
//! by every handler.

use crate::dispatch::Gateway;
use casa_core::Interpreter;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub interpreter: Arc<Interpreter>,
    pub gateway: Gateway,
}
