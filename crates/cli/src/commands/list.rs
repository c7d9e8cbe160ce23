//! List the registered models.

use banter_core::AppResult;
use banter_llm::ModelRegistry;

/// Print every registry entry with its ordinal index.
pub fn execute() -> AppResult<()> {
    let registry = ModelRegistry::builtin();
    for (i, model) in registry.models().iter().enumerate() {
        println!("[{}] {}  {}", i, model.short_name, model.display_name);
    }
    Ok(())
}
