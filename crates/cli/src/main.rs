//! banter CLI
//!
//! Main entry point for the banter command-line chat client. With no
//! arguments it opens an interactive session; positional arguments are
//! either a recognized subcommand (`list`, `install`) or a one-shot query.

mod commands;
mod session;

use banter_core::{config::AppConfig, logging, AppResult};
use clap::Parser;
use std::io::{IsTerminal, Read};

/// Chat with a remote language model
#[derive(Parser, Debug)]
#[command(name = "banter")]
#[command(about = "Chat with a remote language model", long_about = None)]
#[command(version)]
struct Cli {
    /// Model short name or registry index
    #[arg(short, long)]
    model: Option<String>,

    /// Reserved; accepted but currently unused
    #[arg(long, hide = true)]
    server: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,

    /// `list`, `install`, or free-text query tokens
    args: Vec<String>,
}

/// What the positional arguments and stdin add up to.
enum Mode {
    Interactive,
    Query(String),
    List,
    Install,
}

impl Cli {
    fn mode(&self) -> Mode {
        match self.args.first().map(String::as_str) {
            Some("list") => return Mode::List,
            Some("install") => return Mode::Install,
            _ => {}
        }

        let mut query = self.args.join(" ");

        // Piped input becomes the query, or extends an argument query
        if !std::io::stdin().is_terminal() {
            let mut piped = String::new();
            if std::io::stdin().read_to_string(&mut piped).is_ok() {
                let piped = piped.trim();
                if !piped.is_empty() {
                    if query.is_empty() {
                        query = piped.to_string();
                    } else {
                        query = format!("{} {}", query, piped);
                    }
                }
            }
        }

        if query.is_empty() {
            Mode::Interactive
        } else {
            Mode::Query(query)
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let config = config.with_overrides(
        cli.model.clone(),
        cli.log_level.clone(),
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("banter starting");
    tracing::debug!("Default model: {}", config.default_model);

    let result = match cli.mode() {
        Mode::List => commands::list::execute(),
        Mode::Install => commands::install::execute(),
        Mode::Query(query) => {
            commands::query::execute(&config, &config.default_model, &query).await
        }
        Mode::Interactive => commands::interactive::execute(&config, cli.model.as_deref()).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
