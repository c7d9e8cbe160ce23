//! Conversation log types.
//!
//! A conversation is an ordered, append-only sequence of turns. The first
//! turn is always the system prompt; every assistant turn answers the user
//! turn immediately before it. The session keeps those invariants by only
//! mutating the log through the operations here: failed exchanges are
//! rolled back, and `clear` truncates back to the system turn.

/// Speaker role of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire-format role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message in a conversation: a role and its literal text.
/// Serialization happens downstream, through `format::ChatMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// The ordered log of turns for one session.
///
/// Exclusively owned by its session; never shared across threads.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start a conversation with its system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::new(Role::System, system_prompt)],
        }
    }

    /// All turns, in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a user turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::new(Role::User, text));
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::new(Role::Assistant, text));
    }

    /// Remove the most recent turn if it is an unanswered user turn.
    ///
    /// Called after a failed dispatch so the log only ever records
    /// completed exchanges.
    pub fn rollback_user(&mut self) {
        if self.turns.last().map(|t| t.role) == Some(Role::User) {
            self.turns.pop();
        }
    }

    /// Truncate back to just the system turn.
    pub fn clear(&mut self) {
        self.turns.truncate(1);
    }

    /// Render the conversation as a human-readable transcript.
    ///
    /// For each turn: a role header line, a blank line, the text, and two
    /// trailing newlines, with an 80-dash separator between turns.
    pub fn transcript(&self) -> String {
        let separator = "-".repeat(80);
        self.turns
            .iter()
            .map(|turn| format!("{}\n\n{}\n\n", turn.role.as_str(), turn.text))
            .collect::<Vec<_>>()
            .join(&format!("{}\n", separator))
    }
}
