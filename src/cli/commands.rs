//! CLI commands
//!
//! Special commands that can be typed at the REPL prompt.

use crate::agent::AgentSession;
use crate::core::Config;

/// Result of parsing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Not a command; send to the agent
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Start a fresh session
    Clear,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, session: &AgentSession) -> CommandResult {
    let input = input.trim();

    match input.to_lowercase().as_str() {
        "exit" | "quit" | "q" => CommandResult::Exit,
        "clear" | "reset" => CommandResult::Clear,
        "help" | "?" => CommandResult::Handled(help_text()),
        "tools" => CommandResult::Handled(format!(
            "Available tools:\n{}",
            session
                .tool_names()
                .iter()
                .map(|name| format!("  - {}", name))
                .collect::<Vec<_>>()
                .join("\n")
        )),
        "status" => {
            let config = session.config();
            CommandResult::Handled(format!(
                "Steward Status:\n\
                 ─────────────────────────────\n\
                 Provider:   {}\n\
                 Model:      {}\n\
                 Max rounds: {}\n\
                 History:    {} messages\n\
                 Debug:      {}",
                session.provider_name(),
                config.llm.model,
                config.agent.max_tool_rounds,
                session.conversation_length(),
                if config.agent.debug { "on" } else { "off" }
            ))
        }
        "config" => CommandResult::Handled(
            match toml::to_string_pretty(session.config()) {
                Ok(text) => format!("# {}\n{}", Config::config_file().display(), text),
                Err(e) => format!("Failed to render config: {}", e),
            },
        ),
        "save" => CommandResult::Handled(match session.config().save() {
            Ok(path) => format!("Saved settings to {}", path.display()),
            Err(e) => format!("Error: {}", e),
        }),
        _ => CommandResult::Continue(input.to_string()),
    }
}

fn help_text() -> String {
    "Ask anything about family offices, markets or a listed company.\n\
     \n\
     Commands:\n\
     \x20 help     Show this help\n\
     \x20 tools    List the tools the assistant can use\n\
     \x20 status   Show model and session details\n\
     \x20 config   Show the active settings\n\
     \x20 save     Write the active settings to the config file\n\
     \x20 clear    Start a new conversation\n\
     \x20 exit     Quit (Ctrl+D works too)"
        .to_string()
}
