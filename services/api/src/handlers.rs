//! Axum Handlers for the REST API
//!
//! This module exposes the three operations of the interpretation pipeline
//! over HTTP. It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    models::{CommandPayload, CommandResponse, ErrorResponse, HistoryEntry},
    state::AppState,
};

pub const COMMAND_REQUIRED: &str = "Command is required and must be a non-empty string.";

pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

/// Interpret a natural-language command.
///
/// Model failures are not HTTP errors: they are reported in the `error` field
/// of a normal response.
#[utoipa::path(
    post,
    path = "/command",
    request_body = CommandPayload,
    responses(
        (status = 200, description = "Command interpreted", body = CommandResponse),
        (status = 400, description = "Missing or blank command", body = ErrorResponse)
    )
)]
pub async fn post_command(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CommandPayload>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = match payload {
        Ok(Json(payload)) if !payload.command.trim().is_empty() => payload.command,
        Ok(_) => return Err(ApiError::BadRequest(COMMAND_REQUIRED.to_string())),
        Err(rejection) => {
            warn!(error = %rejection, "Rejected command payload");
            return Err(ApiError::BadRequest(COMMAND_REQUIRED.to_string()));
        }
    };

    info!(command = %command, "Processing command");
    let result = state.interpreter.interpret(&command).await;
    state.gateway.dispatch(&result);

    Ok(Json(result.into()))
}

/// List recorded conversation turns, oldest first.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "Recorded turns", body = [HistoryEntry])
    )
)]
pub async fn list_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    let turns = state.interpreter.list_history().await;
    Json(turns.into_iter().map(HistoryEntry::from).collect())
}

/// Forget all recorded conversation turns.
#[utoipa::path(
    delete,
    path = "/history",
    responses(
        (status = 204, description = "History cleared")
    )
)]
pub async fn reset_history(State(state): State<Arc<AppState>>) -> StatusCode {
    state.interpreter.reset_history().await;
    StatusCode::NO_CONTENT
}
