//! Interactive REPL for Steward
//!
//! Reads one line, prints the assistant's answer, repeats until EOF or exit.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::agent::AgentSession;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};
use crate::llm::{GroqClient, LLMProvider};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    config: Config,
    llm: Arc<dyn LLMProvider>,
    session: AgentSession,
}

impl Repl {
    /// Create a REPL backed by the configured Groq endpoint
    pub fn with_config(config: Config) -> Result<Self> {
        let llm: Arc<dyn LLMProvider> = Arc::new(GroqClient::from_config(&config)?);
        Self::with_provider(config, llm)
    }

    /// Create a REPL that talks to `llm`
    pub fn with_provider(config: Config, llm: Arc<dyn LLMProvider>) -> Result<Self> {
        let session = AgentSession::new(config.clone(), Arc::clone(&llm))?;
        Ok(Self {
            config,
            llm,
            session,
        })
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, &self.session) {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Clear => {
                    self.session = AgentSession::new(self.config.clone(), Arc::clone(&self.llm))?;
                    println!("Conversation cleared.\n");
                }
                CommandResult::Handled(output) => println!("{}\n", output),
                CommandResult::Continue(question) => match self.session.process(&question).await {
                    Ok(response) => println!("\nAssistant:\n{}\n", response),
                    Err(e) => eprintln!("\nError: {}\n", e),
                },
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        println!();
        println!("Steward - Family Office Assistant");
        println!("Model:  {} via {}", self.config.llm.model, self.llm.name());
        println!("Tools:  {}", self.session.tool_names().join(", "));
        println!();
        println!("Commands: help, tools, status, config, clear, exit");
        println!("─────────────────────────────────────────────");
    }
}
