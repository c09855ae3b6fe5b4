//! Device directives and the validator that recognizes them.
//!
//! A model reply may carry one of two payload shapes: a single action
//! (`action`, `device`, `room`) or a command sequence (`commands`, `repeat`,
//! optional `delayMs`). [`validate`] turns a parsed JSON value into the typed
//! [`ActionDetails`] union, or `None` when neither shape matches. It never
//! fills in defaults for missing fields.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// The operations a device executor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnOn,
    TurnOff,
    Lock,
    Unlock,
    Open,
    Close,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::TurnOn,
        Action::TurnOff,
        Action::Lock,
        Action::Unlock,
        Action::Open,
        Action::Close,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::TurnOn => "turn_on",
            Action::TurnOff => "turn_off",
            Action::Lock => "lock",
            Action::Unlock => "unlock",
            Action::Open => "open",
            Action::Close => "close",
        }
    }

    /// Looks up an action by its wire name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single device directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCommand {
    pub action: Action,
    pub device: String,
    pub room: String,
}

/// How many times a sequence runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// A positive number of passes.
    Times(u64),
    Infinite,
}

impl Serialize for Repeat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Repeat::Times(n) => serializer.serialize_u64(*n),
            Repeat::Infinite => serializer.serialize_str("infinite"),
        }
    }
}

/// An ordered list of directives with repeat and pacing semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSequence {
    pub commands: Vec<ActionCommand>,
    pub repeat: Repeat,
    /// Pause between consecutive commands. The 500ms floor suggested to the
    /// model is not enforced here.
    #[serde(rename = "delayMs", skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

/// A validated payload, in whichever shape the model produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionDetails {
    Single(ActionCommand),
    Sequence(CommandSequence),
}

/// Validates a parsed payload against the sequence shape, then the single-action shape.
pub fn validate(value: &Value) -> Option<ActionDetails> {
    let object = value.as_object()?;
    if let Some(sequence) = validate_sequence(object) {
        return Some(ActionDetails::Sequence(sequence));
    }
    validate_single(object).map(ActionDetails::Single)
}

/// Accepts an object whose `action`, `device` and `room` are non-empty strings
/// and whose `action` names a known [`Action`]. Extra fields are ignored.
pub fn validate_single(object: &Map<String, Value>) -> Option<ActionCommand> {
    let action = Action::from_name(non_empty_str(object, "action")?)?;
    let device = non_empty_str(object, "device")?;
    let room = non_empty_str(object, "room")?;
    Some(ActionCommand {
        action,
        device: device.to_string(),
        room: room.to_string(),
    })
}

/// Accepts a non-empty `commands` list in which every entry is a valid single
/// action, plus a valid `repeat` and an optional integer `delayMs`.
pub fn validate_sequence(object: &Map<String, Value>) -> Option<CommandSequence> {
    let entries = object.get("commands")?.as_array()?;
    if entries.is_empty() {
        return None;
    }
    // One bad entry rejects the whole sequence.
    let commands = entries
        .iter()
        .map(|entry| entry.as_object().and_then(validate_single))
        .collect::<Option<Vec<_>>>()?;

    let repeat = parse_repeat(object.get("repeat")?)?;

    let delay_ms = match object.get("delayMs").or_else(|| object.get("delay_ms")) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_u64()?),
    };

    Some(CommandSequence {
        commands,
        repeat,
        delay_ms,
    })
}

fn parse_repeat(value: &Value) -> Option<Repeat> {
    match value {
        Value::Number(n) => n.as_u64().filter(|n| *n >= 1).map(Repeat::Times),
        Value::String(s) if s == "infinite" => Some(Repeat::Infinite),
        _ => None,
    }
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)?
        .as_str()
        .filter(|s| !s.trim().is_empty())
}
