//! Turns one command into an interpretation result.
//!
//! Ties the pipeline together for one command: compose the prompt from the
//! current history, ask the model, recover and validate any payload, and
//! record the turn. It is the only writer of the conversation history.

use crate::{
    action::{self, ActionDetails},
    error::ModelError,
    extractor,
    history::{ConversationTurn, HistoryStore},
    llm_client::ModelClient,
    prompt,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

/// The answer to one command.
///
/// `action_details` and `error` are never both present. `raw_response` is
/// always human-readable, even when the model call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpretationResult {
    pub raw_response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_details: Option<ActionDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InterpretationResult {
    fn parsed(raw_response: String) -> Self {
        let action_details = extractor::extract_payload(&raw_response)
            .into_payload()
            .and_then(|payload| action::validate(&payload));
        Self {
            raw_response,
            action_details,
            error: None,
        }
    }

    fn failed(err: ModelError) -> Self {
        let raw_response = match &err {
            ModelError::Unavailable => "Language model client is not initialized.".to_string(),
            ModelError::Invocation(detail) => format!("Error generating response: {}", detail),
        };
        Self {
            raw_response,
            action_details: None,
            error: Some(err.to_string()),
        }
    }

    /// The human-readable text preceding any payload.
    pub fn conversational_part(&self) -> &str {
        prompt::conversational_prefix(&self.raw_response)
    }
}

/// Turns natural-language commands into validated device directives.
pub struct Interpreter {
    client: Option<Arc<dyn ModelClient>>,
    history: Mutex<HistoryStore>,
    /// Held for the whole of `interpret` so each prompt sees every earlier turn.
    turn_gate: Mutex<()>,
}

impl Interpreter {
    /// Creates an interpreter with an empty history of `history_capacity` turns.
    ///
    /// Pass `None` when no model client could be built; every request will
    /// then report the client as unavailable.
    pub fn new(client: Option<Arc<dyn ModelClient>>, history_capacity: usize) -> Self {
        Self {
            client,
            history: Mutex::new(HistoryStore::new(history_capacity)),
            turn_gate: Mutex::new(()),
        }
    }

    /// Interprets a single command.
    ///
    /// Model failures are reported in the result and never recorded. Replies
    /// without a usable payload are recorded like any other answer.
    #[instrument(skip(self), fields(history_len))]
    pub async fn interpret(&self, command: &str) -> InterpretationResult {
        let _turn = self.turn_gate.lock().await;

        let snapshot = self.history.lock().await.snapshot();
        tracing::Span::current().record("history_len", snapshot.len());
        let prompt_text = prompt::compose_prompt(&snapshot, command);

        let reply = match &self.client {
            Some(client) => client.generate(&prompt_text).await,
            None => Err(ModelError::Unavailable),
        };

        let result = match reply {
            Ok(raw) => InterpretationResult::parsed(raw),
            Err(e) => {
                error!(error = %e, "Model invocation failed");
                return InterpretationResult::failed(e);
            }
        };

        match &result.action_details {
            Some(ActionDetails::Single(cmd)) => {
                info!(action = %cmd.action, device = %cmd.device, room = %cmd.room, "Recognized single action");
            }
            Some(ActionDetails::Sequence(seq)) => {
                info!(commands = seq.commands.len(), repeat = ?seq.repeat, delay_ms = ?seq.delay_ms, "Recognized command sequence");
            }
            None => debug!("No actionable payload; treating reply as conversation"),
        }

        self.history
            .lock()
            .await
            .append(ConversationTurn::new(command, result.raw_response.clone()));
        result
    }

    /// Returns the recorded turns, oldest first.
    pub async fn list_history(&self) -> Vec<ConversationTurn> {
        self.history.lock().await.snapshot()
    }

    pub async fn reset_history(&self) {
        self.history.lock().await.clear();
        info!("Conversation history cleared");
    }

    pub async fn history_capacity(&self) -> usize {
        self.history.lock().await.capacity()
    }
}
