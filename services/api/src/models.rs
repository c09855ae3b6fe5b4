//! API Models
//!
//! Request and response bodies of the REST API, annotated for OpenAPI
//! generation with `utoipa`.

use casa_core::{ActionDetails, ConversationTurn, InterpretationResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug)]
pub struct CommandPayload {
    #[schema(example = "Turn on the lights in the kitchen")]
    pub command: String,
}

/// The interpretation of one command.
///
/// Exactly one of `action_details` and `error` may be present.
#[derive(Serialize, ToSchema, Debug)]
pub struct CommandResponse {
    #[schema(example = "Okay, I'll get those kitchen lights for you!\n{\"action\": \"turn_on\", \"device\": \"lights\", \"room\": \"kitchen\"}")]
    pub raw_response: String,
    /// A single `{action, device, room}` or a `{commands, repeat, delayMs}` sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub action_details: Option<ActionDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<InterpretationResult> for CommandResponse {
    fn from(result: InterpretationResult) -> Self {
        Self {
            raw_response: result.raw_response,
            action_details: result.action_details,
            error: result.error,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    #[schema(example = "Lock the main door")]
    pub command: String,
    pub raw_response: String,
}

impl From<ConversationTurn> for HistoryEntry {
    fn from(turn: ConversationTurn) -> Self {
        Self {
            command: turn.command().to_string(),
            raw_response: turn.raw_response().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
