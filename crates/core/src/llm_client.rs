use crate::error::ModelError;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A text-in, text-out language model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends a fully composed prompt and returns the model's raw reply.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// An implementation of `ModelClient` for any OpenAI-compatible chat API.
///
/// Google AI Studio exposes Gemini and Gemma models through such an endpoint,
/// so the same client serves both providers.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gemma-3-27b-it").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl ModelClient for OpenAICompatibleClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let invocation = |e: async_openai::error::OpenAIError| ModelError::Invocation(e.to_string());

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()
                    .map_err(invocation)?
                    .into(),
            ])
            .build()
            .map_err(invocation)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(invocation)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::Invocation("LLM response had no text content.".to_string()))
    }
}

/// A `ModelClient` that replays a fixed script of replies, cycling when exhausted.
///
/// Useful for running the service offline and for integration tests.
pub struct CannedModelClient {
    replies: Vec<String>,
    next: AtomicUsize,
}

impl CannedModelClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ModelClient for CannedModelClient {
    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        if self.replies.is_empty() {
            return Err(ModelError::Invocation(
                "No canned replies configured.".to_string(),
            ));
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        Ok(self.replies[index].clone())
    }
}
