//! Agent loop state management
//!
//! Tracks where a user turn is in the tool-calling loop and how many
//! tool-call rounds it has used.

use crate::core::ToolResult;

/// Where the loop is within one user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingUserInput,
    ConsultingModel,
    ExecutingTool,
    Done,
}

/// State of one user turn
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Current phase
    pub phase: Phase,
    /// Completed tool-call rounds
    pub round: usize,
    /// Maximum allowed rounds
    pub max_rounds: usize,
    /// Results of every tool run this turn, in execution order
    pub observations: Vec<ToolResult>,
    /// Final answer once the turn is done
    pub final_answer: Option<String>,
}

impl AgentLoopState {
    /// Create a new loop state with the given round cap
    pub fn new(max_rounds: usize) -> Self {
        Self {
            phase: Phase::AwaitingUserInput,
            round: 0,
            max_rounds,
            observations: Vec::new(),
            final_answer: None,
        }
    }

    /// Move to the next phase
    pub fn enter(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Whether another round of tool calls is allowed
    pub fn can_run_tools(&self) -> bool {
        self.round < self.max_rounds
    }

    /// Record the results of one finished round
    pub fn finish_round(&mut self, results: Vec<ToolResult>) {
        self.observations.extend(results);
        self.round += 1;
        self.phase = Phase::ConsultingModel;
    }

    /// Close the turn with `answer`
    pub fn finish(&mut self, answer: impl Into<String>) {
        self.final_answer = Some(answer.into());
        self.phase = Phase::Done;
    }

    /// Number of tool runs that failed
    pub fn failed_tools(&self) -> usize {
        self.observations.iter().filter(|o| !o.success).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_state_new() {
        let state = AgentLoopState::new(10);
        assert_eq!(state.phase, Phase::AwaitingUserInput);
        assert_eq!(state.round, 0);
        assert!(state.observations.is_empty());
        assert!(state.final_answer.is_none());
    }

    #[test]
    fn test_round_cap() {
        let mut state = AgentLoopState::new(2);
        assert!(state.can_run_tools());

        state.finish_round(vec![ToolResult::success("search_internet", "[]")]);
        assert!(state.can_run_tools());
        assert_eq!(state.phase, Phase::ConsultingModel);

        state.finish_round(vec![ToolResult::failure("request_url", "Error")]);
        assert!(!state.can_run_tools());
        assert_eq!(state.failed_tools(), 1);
    }

    #[test]
    fn test_zero_cap_allows_no_tools() {
        assert!(!AgentLoopState::new(0).can_run_tools());
    }

    #[test]
    fn test_finish() {
        let mut state = AgentLoopState::new(3);
        state.finish("done");
        assert_eq!(state.phase, Phase::Done);
        assert_eq!(state.final_answer.as_deref(), Some("done"));
    }
}
