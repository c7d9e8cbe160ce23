//! One-shot query mode.
//!
//! Builds a two-turn conversation (system prompt + query), dispatches it
//! once, and prints either the reply or the error message. Dispatch
//! failures never propagate past this boundary; the process still exits 0.

use banter_core::{AppConfig, AppResult};
use banter_llm::{Conversation, Dispatcher, ModelRegistry};

/// Send a single query to the selected model and print the result.
pub async fn execute(config: &AppConfig, model_key: &str, query: &str) -> AppResult<()> {
    let registry = ModelRegistry::builtin();
    let model = registry.lookup(model_key)?;

    let mut conversation = Conversation::new(&config.system_prompt);
    conversation.push_user(query);

    match Dispatcher::new().send(model, &conversation).await {
        Ok(reply) => println!("{}", reply),
        Err(e) => println!("{}", e),
    }

    Ok(())
}
