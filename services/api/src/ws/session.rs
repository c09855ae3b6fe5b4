//! Manages the WebSocket connection lifecycle for a device executor.

use super::protocol::ServerMessage;
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, instrument, warn};

const GREETING: &str = "Connection to command server successful!";

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Forwards every dispatched message to one executor until either side hangs up.
///
/// Messages from the executor are only logged.
#[instrument(name = "executor_connection", skip_all, fields(connection_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id: u32 = rand::random();
    tracing::Span::current().record("connection_id", connection_id);
    info!("Executor connected");

    let (mut socket_tx, mut socket_rx) = socket.split();
    let mut updates = state.gateway.subscribe();

    if send_msg(&mut socket_tx, ServerMessage::Info(GREETING.to_string()))
        .await
        .is_err()
    {
        warn!("Failed to greet executor; closing connection.");
        return;
    }

    loop {
        tokio::select! {
            incoming = socket_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => info!(message = %text.as_str(), "Received message from executor"),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = ?e, "Error receiving from executor WebSocket");
                    break;
                }
            },
            update = updates.recv() => match update {
                Ok(message) => {
                    if let Err(e) = send_msg(&mut socket_tx, message).await {
                        warn!(error = ?e, "Failed to forward message to executor");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Executor fell behind; skipped messages");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("Executor disconnected");
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dispatch::Gateway, router::create_router};
    use casa_core::{Action, ActionCommand, ActionDetails, InterpretationResult, Interpreter};
    use serde_json::{Value, json};
    use std::{net::SocketAddr, time::Duration};
    use tokio::net::TcpStream;
    use tokio_tungstenite::{
        MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message as WsMessage,
    };

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn serve(gateway: Gateway) -> SocketAddr {
        let state = Arc::new(AppState {
            interpreter: Arc::new(Interpreter::new(None, 5)),
            gateway,
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn connect(addr: SocketAddr) -> Client {
        let (client, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
        client
    }

    async fn next_json(client: &mut Client) -> Value {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("connection closed")
                .unwrap();
            if let WsMessage::Text(text) = frame {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_executor_is_greeted_then_receives_dispatched_messages() {
        let gateway = Gateway::default();
        let addr = serve(gateway.clone()).await;
        let mut client = connect(addr).await;

        assert_eq!(
            next_json(&mut client).await,
            json!({"type": "info", "payload": GREETING})
        );

        gateway.dispatch(&InterpretationResult {
            raw_response: "On it!\n{}".to_string(),
            action_details: Some(ActionDetails::Single(ActionCommand {
                action: Action::Lock,
                device: "door".to_string(),
                room: "Main".to_string(),
            })),
            error: None,
        });

        assert_eq!(
            next_json(&mut client).await,
            json!({"type": "info", "payload": "On it!"})
        );
        assert_eq!(
            next_json(&mut client).await,
            json!({"type": "command", "payload": "lock door main"})
        );
    }

    #[tokio::test]
    async fn test_lagging_executor_skips_to_newest_messages() {
        let gateway = Gateway::new(2);
        let addr = serve(gateway.clone()).await;
        let mut client = connect(addr).await;
        next_json(&mut client).await;

        // No await between sends, so the connection task cannot keep up.
        for i in 0..5 {
            gateway.send(ServerMessage::Info(format!("update {}", i)));
        }

        assert_eq!(
            next_json(&mut client).await,
            json!({"type": "info", "payload": "update 3"})
        );
        assert_eq!(
            next_json(&mut client).await,
            json!({"type": "info", "payload": "update 4"})
        );
    }
}
