//! Prompt formatting for the two API families.
//!
//! ChatMessage backends take the conversation as-is, one structured record
//! per turn. RawTemplate backends only accept flat text, so the
//! conversation is linearized with per-role delimiters and ends in a bare
//! assistant prefix: the generation cue telling the backend where its
//! completion starts.

use serde::Serialize;

use crate::conversation::{Conversation, Role, Turn};
use crate::template::PromptTemplate;

/// One `{role, content}` record of a chat-completions message array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Map a conversation to a structured message sequence, preserving role
/// and order verbatim.
pub fn chat_messages(conversation: &Conversation) -> Vec<ChatMessage> {
    conversation
        .turns()
        .iter()
        .map(|turn| ChatMessage {
            role: turn.role.as_str(),
            content: turn.text.clone(),
        })
        .collect()
}

/// Linearize a conversation into one flat prompt string.
///
/// The first two turns (system prompt + first user message) become either
/// two delimited blocks, or, when the template has no system entry, a
/// single user block holding both texts joined by a newline. Every later
/// turn becomes one block wrapped in its own role's delimiters. The bare
/// assistant prefix is appended last as the generation cue.
///
/// The conversation must hold at least the system turn and one user turn;
/// anything shorter is a bug in the caller.
pub fn flatten_prompt(template: &PromptTemplate, conversation: &Conversation) -> String {
    let turns = conversation.turns();
    debug_assert!(turns.len() >= 2, "conversation must hold system + user turns");

    let to_block = |role: Role, text: &str| {
        let delims = template.delims(role);
        format!("{}{}{}\n", delims.prefix, text, delims.suffix)
    };

    let mut prompt = if template.system.is_some() {
        to_block(turns[0].role, &turns[0].text) + &to_block(turns[1].role, &turns[1].text)
    } else {
        let merged = format!("{}\n{}", turns[0].text, turns[1].text);
        to_block(Role::User, &merged)
    };

    for Turn { role, text } in &turns[2..] {
        prompt.push_str(&to_block(*role, text));
    }

    prompt.push_str(&template.delims(Role::Assistant).prefix);
    prompt
}
