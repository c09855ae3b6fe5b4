//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, the executor WebSocket endpoint, and OpenAPI
//! documentation.

use crate::{
    handlers,
    models::{CommandPayload, CommandResponse, ErrorResponse, HistoryEntry},
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::post_command,
        handlers::list_history,
        handlers::reset_history,
    ),
    components(
        schemas(CommandPayload, CommandResponse, HistoryEntry, ErrorResponse)
    ),
    tags(
        (name = "Casa API", description = "Natural-language smart home command interpretation")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/command", post(handlers::post_command))
        .route(
            "/history",
            get(handlers::list_history).delete(handlers::reset_history),
        )
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dispatch::Gateway, handlers::COMMAND_REQUIRED, ws::protocol::ServerMessage};
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use casa_core::{
        Interpreter,
        llm_client::{CannedModelClient, ModelClient},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const KITCHEN_REPLY: &str =
        "Okay!\n{\"action\":\"turn_on\",\"device\":\"lights\",\"room\":\"kitchen\"}";

    fn app_state(client: Option<Arc<dyn ModelClient>>, capacity: usize) -> Arc<AppState> {
        Arc::new(AppState {
            interpreter: Arc::new(Interpreter::new(client, capacity)),
            gateway: Gateway::default(),
        })
    }

    fn canned(replies: &[&str]) -> Option<Arc<dyn ModelClient>> {
        let client: Arc<dyn ModelClient> = Arc::new(CannedModelClient::new(replies.iter().copied()));
        Some(client)
    }

    async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_command_returns_action_details_and_notifies_executors() {
        let state = app_state(canned(&[KITCHEN_REPLY]), 5);
        let mut executor = state.gateway.subscribe();
        let router = create_router(state.clone());

        let (status, body) = send(
            router,
            Method::POST,
            "/command",
            Some(json!({"command": "Turn on the kitchen lights"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "raw_response": KITCHEN_REPLY,
                "action_details": {"action": "turn_on", "device": "lights", "room": "kitchen"}
            })
        );
        assert_eq!(executor.recv().await.unwrap(), ServerMessage::Info("Okay!".to_string()));
        assert_eq!(
            executor.recv().await.unwrap(),
            ServerMessage::Command("turn_on lights kitchen".to_string())
        );
    }

    #[tokio::test]
    async fn test_blank_or_missing_command_is_rejected() {
        let state = app_state(canned(&["unused"]), 5);

        for body in [json!({"command": "   "}), json!({}), json!({"command": 12})] {
            let (status, response) =
                send(create_router(state.clone()), Method::POST, "/command", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response, json!({"message": COMMAND_REQUIRED}));
        }

        assert!(state.interpreter.list_history().await.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_is_a_normal_response() {
        let state = app_state(None, 5);

        let (status, body) = send(
            create_router(state.clone()),
            Method::POST,
            "/command",
            Some(json!({"command": "Lock the door"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], json!("Client not initialized"));
        assert!(body.get("action_details").is_none());
        assert!(body["raw_response"].is_string());

        let (_, history) = send(create_router(state), Method::GET, "/history", None).await;
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_history_lists_and_resets() {
        let state = app_state(canned(&["Hello!", "Hi again!"]), 5);

        for command in ["Hi", "Hi once more"] {
            send(
                create_router(state.clone()),
                Method::POST,
                "/command",
                Some(json!({"command": command})),
            )
            .await;
        }

        let (status, history) =
            send(create_router(state.clone()), Method::GET, "/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            history,
            json!([
                {"command": "Hi", "raw_response": "Hello!"},
                {"command": "Hi once more", "raw_response": "Hi again!"}
            ])
        );

        let (status, _) =
            send(create_router(state.clone()), Method::DELETE, "/history", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, history) = send(create_router(state), Method::GET, "/history", None).await;
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_history_respects_capacity() {
        let state = app_state(canned(&["ok"]), 2);

        for i in 0..3 {
            send(
                create_router(state.clone()),
                Method::POST,
                "/command",
                Some(json!({"command": format!("command {}", i)})),
            )
            .await;
        }

        let (_, history) = send(create_router(state), Method::GET, "/history", None).await;
        let commands: Vec<_> = history
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["command"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(commands, vec!["command 1", "command 2"]);
    }

    #[test]
    fn test_openapi_document_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/command"));
        assert!(doc.paths.paths.contains_key("/history"));
    }
}
