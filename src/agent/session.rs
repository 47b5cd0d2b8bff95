//! Agent session
//!
//! One conversation with the assistant. The session owns its transcript, its
//! LLM handle and its tool registry, and runs the tool-calling loop:
//! consult the model, run any tools it asks for, feed the results back, and
//! stop at the first turn without tool calls.

use std::sync::Arc;

use crate::agent::conversation::Conversation;
use crate::agent::loop_state::{AgentLoopState, Phase};
use crate::core::{Config, Message, Result};
use crate::llm::{GenerateOptions, GroqClient, LLMProvider, LLMResponse};
use crate::tools::ToolRegistry;

const EMPTY_ANSWER: &str = "I apologize, but I couldn't generate a response.";
const FAILED_ANSWER: &str = "I could not answer this because the model request failed.";

/// A conversation with the assistant
pub struct AgentSession {
    /// Configuration
    config: Config,
    /// LLM client
    llm: Arc<dyn LLMProvider>,
    /// Tool registry
    tools: ToolRegistry,
    /// Conversation history
    conversation: Conversation,
}

impl AgentSession {
    /// Create a session that talks to `llm`
    pub fn new(config: Config, llm: Arc<dyn LLMProvider>) -> Result<Self> {
        let tools = ToolRegistry::from_config(&config)?;
        let conversation = Conversation::new(system_prompt(&config));

        Ok(Self {
            config,
            llm,
            tools,
            conversation,
        })
    }

    /// Create a session backed by the configured Groq endpoint
    pub fn from_config(config: Config) -> Result<Self> {
        let llm = Arc::new(GroqClient::from_config(&config)?);
        Self::new(config, llm)
    }

    /// Answer one user message, running tools as the model requests
    pub async fn process(&mut self, user_input: &str) -> Result<String> {
        self.conversation.add_user(user_input);

        match self.run_turn().await {
            Ok(answer) => {
                self.conversation.add_assistant(&answer);
                Ok(answer)
            }
            Err(e) => {
                // Every turn ends on an assistant message, even a failed one
                self.conversation.add_assistant(format!("{} ({})", FAILED_ANSWER, e));
                Err(e)
            }
        }
    }

    /// The tool-calling loop for the latest user message
    async fn run_turn(&mut self) -> Result<String> {
        let mut state = AgentLoopState::new(self.config.agent.max_tool_rounds);

        loop {
            state.enter(Phase::ConsultingModel);
            let response = self.consult_model().await?;

            if !response.wants_tools() {
                let answer = if response.content.trim().is_empty() {
                    EMPTY_ANSWER.to_string()
                } else {
                    response.content
                };
                state.finish(answer);
                break;
            }

            if !state.can_run_tools() {
                tracing::warn!(
                    rounds = state.round,
                    "model still wants tools after the round limit"
                );
                state.finish(format!(
                    "I could not complete this request within {} tool-call rounds. \
                     Please try a narrower question.",
                    state.max_rounds
                ));
                break;
            }

            state.enter(Phase::ExecutingTool);
            let round = state.round + 1;
            let calls = response.tool_calls;
            self.conversation.add_tool_calls(response.content, calls.clone());

            // One at a time, in the order the model asked for them
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                println!("[Round {}] Calling {}...", round, call.name);
                let result = self.tools.invoke(call).await;
                let status = if result.success { "✓" } else { "✗" };
                println!("  {} {}", status, result.tool_name);

                self.conversation.add_tool_result(&call.id, &result.output);
                results.push(result);
            }

            state.finish_round(results);
        }

        tracing::debug!(
            rounds = state.round,
            tools = state.observations.len(),
            failed = state.failed_tools(),
            "turn complete"
        );

        Ok(state
            .final_answer
            .take()
            .unwrap_or_else(|| EMPTY_ANSWER.to_string()))
    }

    /// Send the whole transcript and the tool schemas to the model
    async fn consult_model(&self) -> Result<LLMResponse> {
        let messages = self.conversation.get_messages();
        let tools = self.tools.describe_all();

        tracing::debug!(
            messages = messages.len(),
            tools = tools.len(),
            provider = self.llm.name(),
            "consulting model"
        );

        let response = self
            .llm
            .chat_with_tools(
                &self.config.llm.model,
                &messages,
                &tools,
                Some(GenerateOptions {
                    temperature: Some(self.config.llm.temperature),
                    parallel_tool_calls: Some(false),
                    ..Default::default()
                }),
            )
            .await?;

        if let Some(ref usage) = response.usage {
            tracing::debug!(
                model = %response.model,
                prompt = usage.prompt_tokens,
                completion = usage.completion_tokens,
                total = usage.total_tokens,
                "token usage"
            );
        }

        Ok(response)
    }

    /// Messages exchanged so far, without the system prompt
    pub fn transcript(&self) -> &[Message] {
        self.conversation.history()
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names of the tools offered to the model
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.names()
    }

    /// Name of the LLM provider
    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }

    /// Get conversation length
    pub fn conversation_length(&self) -> usize {
        self.conversation.len()
    }
}

/// Configured prompt, or the family office prompt with today's date
fn system_prompt(config: &Config) -> String {
    match config.agent.system_prompt {
        Some(ref prompt) => prompt.clone(),
        None => format!(
            "You are a helpful Family Office Assistant that answers queries about family offices \
             and finance using internet search, web pages and stock data, and gives accurate \
             information for the question asked. Today is {}.",
            chrono::Local::now().format("%Y-%m-%d")
        ),
    }
}
