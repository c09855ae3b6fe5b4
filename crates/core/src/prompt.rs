//! Prompt composition.
//!
//! The prompt is a fixed instruction block followed by the rendered
//! conversation history and the current command. Only the conversational part
//! of each earlier reply is fed back to the model; embedded payloads are
//! dropped so the model does not copy stale directives.

use crate::history::ConversationTurn;

const INSTRUCTIONS: &str = r#"You are a friendly and slightly jovial smart home assistant.
Decide whether the current command is a smart home instruction or a general query, taking the conversation history into account when it is provided.

If it is a single smart home instruction:
1. Reply with a short, friendly acknowledgement.
2. On a NEW LINE, give a JSON object with the fields "action", "device" and "room".

If it asks for several steps, a repetition or a timed pattern:
1. Reply with a short, friendly acknowledgement.
2. On a NEW LINE, give a JSON object with the fields "commands" (a list of objects with "action", "device" and "room"), "repeat" (a positive whole number, or "infinite") and optionally "delayMs" (milliseconds between commands, at least 500).

Valid actions: turn_on, turn_off, lock, unlock, open, close.
Valid rooms: living room, kitchen, bedroom, bathroom, office, main.

If it is a general query, answer conversationally with a warm and slightly jovial tone and do not include any JSON.
Format the whole reply so it reads well in a terminal.

Smart Home Examples:
Command: Turn on the lights in the kitchen.
Response:
Okay, I'll get those kitchen lights for you!
{"action": "turn_on", "device": "lights", "room": "kitchen"}

Command: Lock the main door.
Response:
You got it! Locking the main door now.
{"action": "lock", "device": "door", "room": "main"}

Command: Flash the office fan on and off twice, two seconds apart.
Response:
One fan disco coming right up!
{"commands": [{"action": "turn_on", "device": "fan", "room": "office"}, {"action": "turn_off", "device": "fan", "room": "office"}], "repeat": 2, "delayMs": 2000}

General Query Examples:
Command: What is the capital of France?
Response: Well, hello there! The capital of France is Paris, a truly lovely city!

Command: Tell me a fun fact.
Response: Why certainly! Did you know that honey never spoils? How neat is that!"#;

const HISTORY_HEADER: &str = "Conversation History (chronological, most recent is last):";
const HISTORY_FOOTER: &str = "---\n\nCurrent Interaction:";

/// Returns the human-readable part of a reply: everything before the first
/// `{`, trimmed. A reply without `{` is returned trimmed in full.
pub fn conversational_prefix(raw_response: &str) -> &str {
    match raw_response.find('{') {
        Some(start) => raw_response[..start].trim(),
        None => raw_response.trim(),
    }
}

/// Renders earlier turns as a prompt segment.
///
/// Turns whose reply has no conversational text are skipped. When nothing is
/// left the segment is empty rather than a bare header.
pub fn render_history(turns: &[ConversationTurn]) -> String {
    let blocks: Vec<String> = turns
        .iter()
        .filter_map(|turn| {
            let prefix = conversational_prefix(turn.raw_response());
            if prefix.is_empty() {
                return None;
            }
            Some(format!(
                "Previous User: {}\nPrevious Assistant: {}",
                turn.command(),
                prefix
            ))
        })
        .collect();

    if blocks.is_empty() {
        return String::new();
    }
    format!(
        "{}\n{}\n\n{}",
        HISTORY_HEADER,
        blocks.join("\n\n"),
        HISTORY_FOOTER
    )
}

/// Builds the complete instruction text for one request.
pub fn compose_prompt(turns: &[ConversationTurn], command: &str) -> String {
    let history = render_history(turns);
    let mut prompt = String::with_capacity(INSTRUCTIONS.len() + history.len() + command.len() + 64);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\n");
    if !history.is_empty() {
        prompt.push_str(&history);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Current Command: ");
    prompt.push_str(command);
    prompt.push_str("\nResponse:\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_stops_at_first_brace() {
        let raw = "Sure!\n{\"action\":\"turn_on\",\"device\":\"lights\",\"room\":\"kitchen\"}";
        assert_eq!(conversational_prefix(raw), "Sure!");
    }

    #[test]
    fn test_prefix_without_brace_is_whole_trimmed_reply() {
        assert_eq!(
            conversational_prefix("  Paris is lovely this time of year.\n"),
            "Paris is lovely this time of year."
        );
    }

    #[test]
    fn test_prefix_of_bare_payload_is_empty() {
        assert_eq!(conversational_prefix("  {\"action\": \"lock\"}"), "");
    }

    #[test]
    fn test_empty_history_renders_nothing() {
        assert_eq!(render_history(&[]), "");
    }

    #[test]
    fn test_history_renders_turns_in_order() {
        let turns = vec![
            ConversationTurn::new(
                "Turn on the kitchen lights",
                "Okay!\n{\"action\":\"turn_on\",\"device\":\"lights\",\"room\":\"kitchen\"}",
            ),
            ConversationTurn::new("Tell me a joke", "Why did the lamp blush? It saw the switch!"),
        ];

        let rendered = render_history(&turns);
        assert_eq!(
            rendered,
            "Conversation History (chronological, most recent is last):\n\
             Previous User: Turn on the kitchen lights\nPrevious Assistant: Okay!\n\n\
             Previous User: Tell me a joke\nPrevious Assistant: Why did the lamp blush? It saw the switch!\n\n\
             ---\n\nCurrent Interaction:"
        );
    }

    #[test]
    fn test_turns_without_conversation_are_omitted() {
        let turns = vec![
            ConversationTurn::new("Lock the door", "{\"action\":\"lock\",\"device\":\"door\",\"room\":\"main\"}"),
            ConversationTurn::new("Hi", "Hello!"),
        ];
        let rendered = render_history(&turns);
        assert!(!rendered.contains("Lock the door"));
        assert!(rendered.contains("Previous User: Hi\nPrevious Assistant: Hello!"));

        let only_payloads = vec![ConversationTurn::new("Lock the door", "   {}")];
        assert_eq!(render_history(&only_payloads), "");
    }

    #[test]
    fn test_prompt_embeds_history_and_command() {
        let turns = vec![ConversationTurn::new("Hi", "Hello there!")];
        let prompt = compose_prompt(&turns, "Open the bedroom blinds");

        let history_at = prompt.find("Previous User: Hi").unwrap();
        let command_at = prompt.find("Current Command: Open the bedroom blinds").unwrap();
        assert!(history_at < command_at);
        assert!(prompt.ends_with("Current Command: Open the bedroom blinds\nResponse:\n"));
    }

    #[test]
    fn test_prompt_without_history_has_no_header() {
        let prompt = compose_prompt(&[], "What time is it?");
        assert!(!prompt.contains(HISTORY_HEADER));
        assert!(prompt.contains("Current Command: What time is it?"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let turns = vec![ConversationTurn::new("Hi", "Hello!")];
        assert_eq!(compose_prompt(&turns, "Hi again"), compose_prompt(&turns, "Hi again"));
    }
}
