//! Agent boundary errors.
//!
//! These never escape the orchestrator: every variant downgrades the module to
//! unresolved.

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent transport error: {0}")]
    Transport(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("malformed agent output: {0}")]
    MalformedOutput(String),

    #[error("model turn limit of {limit} exceeded")]
    TurnLimitExceeded { limit: u32 },

    #[error("tool call limit of {limit} exceeded")]
    ToolCallLimitExceeded { limit: u32 },

    #[error("tool failure: {0}")]
    Tool(String),
}

impl AgentError {
    /// Whether the failure came from a hard resource ceiling.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            AgentError::TurnLimitExceeded { .. } | AgentError::ToolCallLimitExceeded { .. }
        )
    }
}
