//! Interactive mode: model selection menu followed by the chat REPL.

use banter_core::{AppConfig, AppResult};
use banter_llm::ModelRegistry;

use crate::session::{input_lines, select_model, Session};

/// Run an interactive chat session.
///
/// With `preselected` the menu is skipped and the named model is used
/// directly; an unknown name here is a startup error rather than a
/// re-prompt, since the user asked for it explicitly.
pub async fn execute(config: &AppConfig, preselected: Option<&str>) -> AppResult<()> {
    let registry = ModelRegistry::builtin();
    let mut lines = input_lines();

    let model = match preselected {
        Some(key) => {
            let model = registry.lookup(key)?.clone();
            println!("Chatting with {}:", model.display_name);
            model
        }
        None => select_model(&registry, &mut lines).await?,
    };

    let mut session = Session::new(registry, model, &config.system_prompt);
    session.run(&mut lines).await
}
