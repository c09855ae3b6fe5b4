//! Core interpretation pipeline for natural-language smart home commands.
//!
//! A command is folded together with recent conversation into a prompt, sent
//! to a language model, and the reply is searched for a structured payload
//! describing one device action or a timed sequence of them.

pub mod action;
pub mod error;
pub mod extractor;
pub mod history;
pub mod interpreter;
pub mod llm_client;
pub mod prompt;

pub use action::{Action, ActionCommand, ActionDetails, CommandSequence, Repeat};
pub use error::ModelError;
pub use history::{ConversationTurn, DEFAULT_HISTORY_CAPACITY};
pub use interpreter::{InterpretationResult, Interpreter};
