//! Defines the WebSocket message protocol between the server and device executors.

use casa_core::CommandSequence;
use serde::Serialize;

/// Messages pushed from the server to every connected executor.
///
/// Serialized as `{"type": "...", "payload": ...}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Text for display only.
    Info(String),
    /// A single directive rendered as `"<action> <device> <room>"`.
    Command(String),
    /// A validated sequence with rooms normalized to lowercase.
    SequenceCommand(CommandSequence),
}
