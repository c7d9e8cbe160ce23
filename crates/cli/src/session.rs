//! Interactive conversation session.
//!
//! The session owns the conversation log and the REPL: each input line is
//! classified as either a command or a message for the model. Messages are
//! dispatched synchronously, one exchange at a time; a failed exchange is
//! rolled back so the log never holds an unanswered user turn.

use banter_core::{AppError, AppResult};
use banter_llm::{Conversation, Dispatcher, ModelConfig, ModelRegistry};
use dialoguer::{Input, Select};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

/// Classification of one REPL input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    /// Blank line, ignored
    Empty,
    /// quit-family: quit, :q, exit
    Quit,
    /// clear-family: clear, restart
    Clear,
    /// swap-family: swap, switch, model
    Swap,
    /// `save <path>`
    Save(String),
    /// Anything else is a message for the model
    Message(String),
}

/// Classify a raw input line. Commands are single words (case-insensitive)
/// except the two-word `save <path>` form; the path keeps its case.
pub fn classify(line: &str) -> ReplInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplInput::Empty;
    }

    match trimmed.to_lowercase().as_str() {
        "quit" | ":q" | "exit" => return ReplInput::Quit,
        "clear" | "restart" => return ReplInput::Clear,
        "swap" | "switch" | "model" => return ReplInput::Swap,
        _ => {}
    }

    if let Some(path) = trimmed
        .split_once(char::is_whitespace)
        .filter(|(word, _)| word.eq_ignore_ascii_case("save"))
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
    {
        return ReplInput::Save(path.to_string());
    }

    ReplInput::Message(trimmed.to_string())
}

/// What the interrupt menu decided.
enum InterruptChoice {
    SaveAndExit,
    DiscardAndExit,
    Resume,
}

/// Line reader over stdin, shared by the REPL and the model selection menu.
pub type InputLines = Lines<BufReader<Stdin>>;

/// Create the stdin line reader for an interactive session.
pub fn input_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// One interactive chat session against a selected model.
pub struct Session {
    registry: ModelRegistry,
    dispatcher: Dispatcher,
    model: ModelConfig,
    conversation: Conversation,
}

impl Session {
    pub fn new(registry: ModelRegistry, model: ModelConfig, system_prompt: &str) -> Self {
        Self {
            registry,
            dispatcher: Dispatcher::new(),
            model,
            conversation: Conversation::new(system_prompt),
        }
    }

    #[cfg(test)]
    fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run the REPL until the user quits or stdin closes.
    pub async fn run(&mut self, lines: &mut InputLines) -> AppResult<()> {
        loop {
            prompt("> ").await?;

            let line = tokio::select! {
                result = lines.next_line() => match result? {
                    Some(line) => line,
                    // stdin closed
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    match self.interrupt_menu()? {
                        InterruptChoice::SaveAndExit => {
                            let path: String = Input::new()
                                .with_prompt("Transcript path")
                                .interact_text()
                                .map_err(|e| AppError::Config(e.to_string()))?;
                            self.save_transcript(&path);
                            break;
                        }
                        InterruptChoice::DiscardAndExit => break,
                        InterruptChoice::Resume => continue,
                    }
                }
            };

            match classify(&line) {
                ReplInput::Empty => {}
                ReplInput::Quit => break,
                ReplInput::Clear => {
                    self.conversation.clear();
                    tracing::debug!("Conversation cleared");
                }
                ReplInput::Swap => {
                    // Conversation is left untouched across a model swap
                    self.model = select_model(&self.registry, lines).await?;
                }
                ReplInput::Save(path) => self.save_transcript(&path),
                ReplInput::Message(text) => match self.exchange(&text).await {
                    Ok(reply) => println!("AI: {}", reply),
                    Err(e) => println!("{}", e),
                },
            }
        }

        Ok(())
    }

    /// Append a user turn and dispatch. On failure the user turn is rolled
    /// back so only completed exchanges remain in the log.
    async fn exchange(&mut self, text: &str) -> AppResult<String> {
        self.conversation.push_user(text);

        match self.dispatcher.send(&self.model, &self.conversation).await {
            Ok(reply) => {
                self.conversation.push_assistant(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                self.conversation.rollback_user();
                Err(e)
            }
        }
    }

    /// Write the transcript to a file, reporting rather than propagating
    /// failures.
    fn save_transcript(&self, path: &str) {
        match std::fs::write(path, self.conversation.transcript()) {
            Ok(()) => println!("Saved transcript to {}", path),
            Err(e) => println!("Could not save transcript: {}", e),
        }
    }

    /// Forced choice after Ctrl-C while waiting for input.
    fn interrupt_menu(&self) -> AppResult<InterruptChoice> {
        let choice = Select::new()
            .with_prompt("Interrupted")
            .items(&["Save and exit", "Discard and exit", "Cancel"])
            .default(2)
            .interact()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(match choice {
            0 => InterruptChoice::SaveAndExit,
            1 => InterruptChoice::DiscardAndExit,
            _ => InterruptChoice::Resume,
        })
    }
}

/// Interactive model selection: list the registry, read a number or short
/// name, re-prompt until the lookup succeeds.
pub async fn select_model(
    registry: &ModelRegistry,
    lines: &mut InputLines,
) -> AppResult<ModelConfig> {
    println!("Available models:");
    for (i, model) in registry.models().iter().enumerate() {
        println!("[{}] {}", i, model.short_name);
    }

    loop {
        prompt("Select a model (enter the number or short name): ").await?;

        let line = lines
            .next_line()
            .await?
            .ok_or_else(|| AppError::Config("Input closed during model selection".to_string()))?;

        match registry.lookup(line.trim()) {
            Ok(model) => {
                println!("Chatting with {}:", model.display_name);
                return Ok(model.clone());
            }
            Err(_) => println!("Please enter a valid number or short name."),
        }
    }
}

/// Print a prompt without a trailing newline and flush it out.
async fn prompt(text: &str) -> AppResult<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_llm::{ApiFamily, Role};
    use serial_test::serial;

    #[test]
    fn test_classify_quit_family_is_case_insensitive() {
        assert_eq!(classify("quit"), ReplInput::Quit);
        assert_eq!(classify(":q"), ReplInput::Quit);
        assert_eq!(classify("EXIT"), ReplInput::Quit);
    }

    #[test]
    fn test_classify_clear_and_swap_families() {
        assert_eq!(classify("clear"), ReplInput::Clear);
        assert_eq!(classify("Restart"), ReplInput::Clear);
        assert_eq!(classify("swap"), ReplInput::Swap);
        assert_eq!(classify("SWITCH"), ReplInput::Swap);
        assert_eq!(classify("model"), ReplInput::Swap);
    }

    #[test]
    fn test_classify_save_keeps_path_case() {
        assert_eq!(
            classify("Save /tmp/My Transcript.txt"),
            ReplInput::Save("/tmp/My Transcript.txt".to_string())
        );
    }

    #[test]
    fn test_classify_save_without_path_is_a_message() {
        assert_eq!(classify("save"), ReplInput::Message("save".to_string()));
    }

    #[test]
    fn test_classify_message_and_empty() {
        assert_eq!(classify("   "), ReplInput::Empty);
        assert_eq!(
            classify("tell me a joke"),
            ReplInput::Message("tell me a joke".to_string())
        );
    }

    fn unreachable_model() -> ModelConfig {
        ModelConfig {
            short_name: "broken".to_string(),
            display_name: "test/broken".to_string(),
            api_family: ApiFamily::ChatMessage,
            endpoint: "http://unused.invalid/".to_string(),
            // Credential that exists in neither the environment nor on disk,
            // so every dispatch fails before any network I/O
            credential_id: "BANTER_SESSION_TEST_MISSING_KEY".to_string(),
            template: None,
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_failed_exchange_rolls_back_user_turn() {
        std::env::remove_var("BANTER_SESSION_TEST_MISSING_KEY");

        let registry = ModelRegistry::from_models(vec![unreachable_model()]);
        let model = registry.lookup("broken").unwrap().clone();
        let mut session = Session::new(registry, model, "sys");

        let len_before = session.conversation().len();
        assert!(session.exchange("hello?").await.is_err());

        assert_eq!(session.conversation().len(), len_before);
        assert_eq!(session.conversation().turns()[0].role, Role::System);
    }

    #[test]
    fn test_save_transcript_writes_expected_format() {
        let registry = ModelRegistry::from_models(vec![unreachable_model()]);
        let model = registry.lookup("broken").unwrap().clone();
        let mut session = Session::new(registry, model, "sys");
        session.conversation.push_user("hello");
        session.conversation.push_assistant("hi");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.txt");
        session.save_transcript(path.to_str().unwrap());

        let contents = std::fs::read_to_string(&path).unwrap();
        let separator = "-".repeat(80);
        assert_eq!(
            contents,
            format!(
                "system\n\nsys\n\n{sep}\nuser\n\nhello\n\n{sep}\nassistant\n\nhi\n\n",
                sep = separator
            )
        );
    }
}
