//! LLM backend crate for the banter CLI.
//!
//! This crate holds everything between "a conversation log" and "a reply
//! string from a remote model": the registry of backend configurations,
//! the prompt formatters for the two API families, and the request
//! dispatcher that performs the HTTP exchange.
//!
//! # Example
//! ```no_run
//! use banter_llm::{Conversation, Dispatcher, ModelRegistry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ModelRegistry::builtin();
//! let model = registry.lookup("llama3")?;
//!
//! let mut conversation = Conversation::new("Provide concise replies.");
//! conversation.push_user("Hello!");
//!
//! let reply = Dispatcher::new().send(model, &conversation).await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

pub mod conversation;
pub mod dispatch;
pub mod format;
pub mod registry;
pub mod template;

// Re-export main types
pub use conversation::{Conversation, Role, Turn};
pub use dispatch::Dispatcher;
pub use format::{chat_messages, flatten_prompt, ChatMessage};
pub use registry::{ApiFamily, ModelConfig, ModelRegistry};
pub use template::{Delims, PromptTemplate};
