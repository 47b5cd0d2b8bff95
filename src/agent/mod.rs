//! Agent module - the tool-calling loop and its transcript
//!
//! Contains the session that coordinates LLM calls and tool execution.

pub mod conversation;
pub mod loop_state;
pub mod session;

pub use conversation::Conversation;
pub use loop_state::{AgentLoopState, Phase};
pub use session::AgentSession;
