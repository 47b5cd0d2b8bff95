//! LLM module - Language Model integrations
//!
//! Provides the provider abstraction with a Groq (OpenAI-compatible) backend.

pub mod groq;
pub mod traits;

pub use groq::GroqClient;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};
