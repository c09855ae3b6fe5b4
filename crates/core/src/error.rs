//! Failures that originate upstream of the interpretation pipeline.
//!
//! Only the model adapter can fail. A reply that carries no usable payload is
//! an ordinary conversational answer and is never reported through this type.

/// An error raised while obtaining a reply from the language model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// No client could be constructed, usually because the credential is missing.
    #[error("Client not initialized")]
    Unavailable,
    /// The call to the model was made but did not produce a reply.
    #[error("{0}")]
    Invocation(String),
}
