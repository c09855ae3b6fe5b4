//! Main Entrypoint for the Casa API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Building the language model client, if a credential is available.
//! 3. Constructing the interpreter and the executor gateway.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use casa_api::{config::Config, dispatch::Gateway, router::create_router, state::AppState};
use casa_core::{
    Interpreter,
    llm_client::{ModelClient, OpenAICompatibleClient},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// Builds the model client, or `None` when the provider has no credential.
fn build_model_client(config: &Config) -> Option<Arc<dyn ModelClient>> {
    match config.require_api_key() {
        Ok(api_key) => {
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(config.provider.api_base());
            let client: Arc<dyn ModelClient> = Arc::new(OpenAICompatibleClient::new(
                openai_config,
                config.chat_model.clone(),
            ));
            Some(client)
        }
        Err(e) => {
            warn!(error = %e, "Language model client not initialized; commands will report an error.");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let model_client = build_model_client(&config);
    let interpreter = Arc::new(Interpreter::new(model_client, config.history_capacity));

    let app_state = Arc::new(AppState {
        interpreter,
        gateway: Gateway::default(),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        history_capacity = config.history_capacity,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
