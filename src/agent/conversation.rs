//! Conversation transcript
//!
//! Append-only record of one session. Messages are never edited or dropped;
//! a new conversation starts with a new session.

use crate::core::{Message, ToolCall};

/// The ordered messages of one session
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    /// Sent ahead of every request, never stored in `messages`
    system_prompt: Option<String>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: Some(system_prompt.into()),
        }
    }

    pub fn add_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Record the assistant turn that requested `calls`
    pub fn add_tool_calls(&mut self, content: impl Into<String>, calls: Vec<ToolCall>) {
        self.messages.push(Message::assistant_tool_calls(content, calls));
    }

    /// Record the output of one tool call
    pub fn add_tool_result(&mut self, call_id: impl Into<String>, output: impl Into<String>) {
        self.messages.push(Message::tool(call_id, output));
    }

    /// Request payload: system prompt, then the transcript
    pub fn get_messages(&self) -> Vec<Message> {
        let mut payload = Vec::with_capacity(self.messages.len() + 1);

        if let Some(ref prompt) = self.system_prompt {
            payload.push(Message::system(prompt.clone()));
        }

        payload.extend(self.messages.iter().cloned());
        payload
    }

    /// Transcript without the system prompt
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
