//! Model registry: the fixed table of backend configurations.
//!
//! Each entry describes one remote model: where to POST, which API family
//! it speaks, which credential unlocks it, and (for raw-template backends)
//! the delimiter template its prompts must be built with. The registry is
//! constructed once at startup and looked up by ordinal index or short
//! name; it is not user-mutable at runtime.

use banter_core::{AppError, AppResult};

use crate::template::{Delims, PromptTemplate};

/// The two wire protocols a backend can speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFamily {
    /// Structured `{role, content}` message array (OpenAI-compatible chat
    /// completions, e.g. OpenRouter)
    ChatMessage,
    /// Single flattened text prompt (HuggingFace-style text inference)
    RawTemplate,
}

/// Configuration for one remote model. Immutable once registered.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Key used on the command line and in the selection menu
    pub short_name: String,

    /// Provider-qualified model identifier sent on the wire
    pub display_name: String,

    pub api_family: ApiFamily,

    /// Base URL for ChatMessage; URL prefix the display name is appended
    /// to for RawTemplate
    pub endpoint: String,

    /// Environment variable name (or fallback file path) holding the API key
    pub credential_id: String,

    /// Prompt delimiters; present iff `api_family` is RawTemplate
    pub template: Option<PromptTemplate>,
}

/// Ordered lookup table of model configurations.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<ModelConfig>,
}

impl ModelRegistry {
    /// The built-in model table.
    pub fn builtin() -> Self {
        let models = vec![
            ModelConfig {
                short_name: "llama3".to_string(),
                display_name: "meta-llama/Meta-Llama-3-8B-Instruct".to_string(),
                api_family: ApiFamily::RawTemplate,
                endpoint: "https://api-inference.huggingface.co/models/".to_string(),
                credential_id: "HUGGINGFACE_API_KEY".to_string(),
                template: Some(PromptTemplate {
                    system: Some(Delims::new(
                        "<|begin_of_text|><|start_header_id|>system<|end_header_id|>\n",
                        "<|eot_id|>",
                    )),
                    user: Delims::new(
                        "<|start_header_id|>user<|end_header_id|>\n",
                        "<|eot_id|>",
                    ),
                    assistant: Delims::new(
                        "<|start_header_id|>assistant<|end_header_id|>\n",
                        "<|eot_id|><|start_header_id|>user<|end_header_id|>",
                    ),
                }),
            },
            ModelConfig {
                short_name: "phi3".to_string(),
                display_name: "microsoft/Phi-3-mini-4k-instruct".to_string(),
                api_family: ApiFamily::RawTemplate,
                endpoint: "https://api-inference.huggingface.co/models/".to_string(),
                credential_id: "HUGGINGFACE_API_KEY".to_string(),
                // Phi-3 has no system role; the system prompt is folded
                // into the first user block
                template: Some(PromptTemplate {
                    system: None,
                    user: Delims::new("<|user|>\n", "<|end|>"),
                    assistant: Delims::new("<|assistant|>\n", "<|end|>"),
                }),
            },
            ModelConfig {
                short_name: "mistral".to_string(),
                display_name: "mistralai/mistral-7b-instruct".to_string(),
                api_family: ApiFamily::ChatMessage,
                endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
                credential_id: "OPENROUTER_API_KEY".to_string(),
                template: None,
            },
        ];

        Self { models }
    }

    /// Build a registry from explicit entries (used by tests).
    pub fn from_models(models: Vec<ModelConfig>) -> Self {
        Self { models }
    }

    /// All entries, in insertion order.
    pub fn models(&self) -> &[ModelConfig] {
        &self.models
    }

    /// Look up a model by ordinal index or exact short name.
    pub fn lookup(&self, key: &str) -> AppResult<&ModelConfig> {
        if let Ok(index) = key.parse::<usize>() {
            return self
                .models
                .get(index)
                .ok_or_else(|| AppError::ModelNotFound(key.to_string()));
        }

        self.models
            .iter()
            .find(|m| m.short_name == key)
            .ok_or_else(|| AppError::ModelNotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let registry = ModelRegistry::builtin();
        let model = registry.lookup("phi3").unwrap();
        assert_eq!(model.display_name, "microsoft/Phi-3-mini-4k-instruct");
        assert_eq!(model.api_family, ApiFamily::RawTemplate);
    }

    #[test]
    fn test_lookup_by_index_follows_insertion_order() {
        let registry = ModelRegistry::builtin();
        assert_eq!(registry.lookup("0").unwrap().short_name, "llama3");
        assert_eq!(registry.lookup("1").unwrap().short_name, "phi3");
        assert_eq!(registry.lookup("2").unwrap().short_name, "mistral");
    }

    #[test]
    fn test_lookup_unknown_name() {
        let registry = ModelRegistry::builtin();
        assert!(matches!(
            registry.lookup("gpt99"),
            Err(AppError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_lookup_index_out_of_range() {
        let registry = ModelRegistry::builtin();
        assert!(matches!(
            registry.lookup("17"),
            Err(AppError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_raw_template_models_carry_a_template() {
        let registry = ModelRegistry::builtin();
        for model in registry.models() {
            match model.api_family {
                ApiFamily::RawTemplate => assert!(model.template.is_some()),
                ApiFamily::ChatMessage => assert!(model.template.is_none()),
            }
        }
    }
}
