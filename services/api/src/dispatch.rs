//! Routes interpretation results to connected device executors.
//!
//! The core validator accepts any non-empty room name. Executors only know a
//! fixed set of rooms, so directives are checked against that set here and
//! demoted to plain `info` text when they cannot be carried out.

use crate::ws::protocol::ServerMessage;
use casa_core::{ActionCommand, ActionDetails, CommandSequence, InterpretationResult};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Rooms an executor can act on, lowercase.
pub const VALID_ROOMS: [&str; 6] = [
    "living room",
    "kitchen",
    "bedroom",
    "bathroom",
    "office",
    "main",
];

/// Converts one interpretation result into the messages executors should see.
pub fn route(result: &InterpretationResult) -> Vec<ServerMessage> {
    if let Some(err) = &result.error {
        return vec![ServerMessage::Info(format!("LLM_ERROR: {}", err))];
    }

    let directive = match &result.action_details {
        Some(ActionDetails::Single(cmd)) => match executable(cmd) {
            Some(cmd) => Some(ServerMessage::Command(format!(
                "{} {} {}",
                cmd.action, cmd.device, cmd.room
            ))),
            None => {
                warn!(?cmd, "Single command targets an unknown room. Treating as info.");
                None
            }
        },
        Some(ActionDetails::Sequence(seq)) => {
            match seq.commands.iter().map(executable).collect::<Option<Vec<_>>>() {
                Some(commands) => Some(ServerMessage::SequenceCommand(CommandSequence {
                    commands,
                    repeat: seq.repeat,
                    delay_ms: seq.delay_ms,
                })),
                None => {
                    warn!("Sequence contains a command for an unknown room. Treating as info.");
                    None
                }
            }
        }
        None => None,
    };

    match directive {
        Some(directive) => {
            let mut messages = Vec::with_capacity(2);
            let conversational = result.conversational_part();
            if !conversational.is_empty() {
                messages.push(ServerMessage::Info(conversational.to_string()));
            }
            messages.push(directive);
            messages
        }
        None => vec![ServerMessage::Info(result.raw_response.clone())],
    }
}

/// Returns the command with its room lowercased, if the room is known.
fn executable(cmd: &ActionCommand) -> Option<ActionCommand> {
    let room = cmd.room.trim().to_lowercase();
    if !VALID_ROOMS.contains(&room.as_str()) {
        return None;
    }
    Some(ActionCommand {
        action: cmd.action,
        device: cmd.device.clone(),
        room,
    })
}

/// Fans messages out to every connected executor.
#[derive(Clone)]
pub struct Gateway {
    tx: broadcast::Sender<ServerMessage>,
}

impl Gateway {
    /// Creates a gateway whose subscribers may fall `buffer` messages behind.
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.tx.subscribe()
    }

    /// Publishes the messages for `result` in order.
    pub fn dispatch(&self, result: &InterpretationResult) {
        for message in route(result) {
            match &message {
                ServerMessage::Command(text) => info!(command = %text, "Sending command to executors"),
                ServerMessage::SequenceCommand(seq) => {
                    info!(commands = seq.commands.len(), "Sending sequence_command to executors")
                }
                ServerMessage::Info(_) => debug!("Sending info to executors"),
            }
            self.send(message);
        }
    }

    pub fn send(&self, message: ServerMessage) {
        // Only fails when nobody is subscribed.
        if self.tx.send(message).is_err() {
            debug!("No executor connected; message dropped");
        }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(64)
    }
}
