//! The seam between the agent loop and a chat model
//!
//! The session only needs "send transcript plus tools, get back text or tool
//! calls", so that is all the trait asks for.

use async_trait::async_trait;

use crate::core::{Message, Result, ToolCall, ToolDefinition};

/// One model turn: either a final answer or a batch of tool requests
#[derive(Debug, Clone, Default)]
pub struct LLMResponse {
    pub content: String,
    /// Empty when the model is done with tools
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<TokenUsage>,
    /// Model name as reported by the provider
    pub model: String,
}

impl LLMResponse {
    /// A final answer with no tool calls
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// A turn that only requests tools
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Default::default()
        }
    }

    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Per-request sampling knobs; `None` leaves the provider default
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Whether the model may request several tools in one turn
    pub parallel_tool_calls: Option<bool>,
}

/// A chat-completions backend that understands tool schemas
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send the full transcript and the tool schemas, return the next turn
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Short provider label for banners and logs
    fn name(&self) -> &str;
}
