//! Role-delimited prompt templates for raw-completion backends.
//!
//! Raw-template backends accept one flat text continuation rather than a
//! structured message array, so every turn has to be wrapped in the
//! delimiter strings that the model was trained on. A template carries one
//! `(prefix, suffix)` pair per role; the `system` entry is optional because
//! some models fold the system instruction into the first user turn.

use crate::conversation::Role;

/// Prefix/suffix delimiter pair wrapping one turn's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delims {
    pub prefix: String,
    pub suffix: String,
}

impl Delims {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

/// Per-role delimiters for building a flattened prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Absent when the backend has no system role; the system prompt is
    /// then merged into the first user block.
    pub system: Option<Delims>,
    pub user: Delims,
    pub assistant: Delims,
}

impl PromptTemplate {
    /// Delimiters for a role.
    ///
    /// Panics when asked for a system entry the template does not define;
    /// the formatter only requests roles it knows are present.
    pub fn delims(&self, role: Role) -> &Delims {
        match role {
            Role::System => self
                .system
                .as_ref()
                .unwrap_or_else(|| panic!("template has no system entry")),
            Role::User => &self.user,
            Role::Assistant => &self.assistant,
        }
    }
}
