//! Steward - Family Office Assistant
//!
//! A conversational assistant that answers family office and finance
//! questions through an LLM that can search the web, read pages and look up
//! stock data.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Provider abstraction with a Groq (OpenAI-compatible) client
//! - **Tools**: Search, page fetch and stock lookup behind a closed registry
//! - **Agent**: The per-conversation session and its tool-calling loop
//! - **CLI**: Line-based REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use steward::{AgentSession, Config};
//!
//! #[tokio::main]
//! async fn main() -> steward::Result<()> {
//!     let mut session = AgentSession::from_config(Config::load())?;
//!     let answer = session
//!         .process("What is the last closing price of the Apple stock?")
//!         .await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::AgentSession;
pub use cli::Repl;
pub use core::{Config, Result, StewardError};
