//! Steward - Family Office Assistant
//!
//! Main entry point for the CLI application.

use clap::Parser;
use steward::{AgentSession, Config, Repl};
use tracing_subscriber::EnvFilter;

/// Steward - Family Office Assistant
#[derive(Parser, Debug)]
#[command(name = "steward")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum tool-call rounds per question
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load();

    if let Some(model) = args.model {
        config.llm.model = model;
    }

    if let Some(max_rounds) = args.max_rounds {
        config.agent.max_tool_rounds = max_rounds;
    }

    if args.debug {
        config.agent.debug = true;
    }

    let default_filter = if config.agent.debug {
        "steward=debug"
    } else {
        "steward=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let mut session = AgentSession::from_config(config)?;
        let response = session.process(&prompt).await?;
        println!("{}", response);
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config)?;
    repl.run().await?;

    Ok(())
}
