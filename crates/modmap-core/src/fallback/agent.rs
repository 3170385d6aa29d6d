//! Contract between the orchestrator and an investigative agent runtime.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::AgentError;
use crate::config::AgentLimits;

/// Identifier an agent returns to confirm that no registry entry matches.
pub const NOT_FOUND_SENTINEL: &str = "NOT_FOUND";

/// Categorical confidence reported by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentConfidence {
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
}

impl AgentConfidence {
    /// Numeric confidence stored on a [`crate::Match`]. Always below an exact hit.
    pub fn score(self) -> f64 {
        match self {
            AgentConfidence::High => 0.95,
            AgentConfidence::Medium => 0.80,
            AgentConfidence::Low => 0.60,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentConfidence::High => "HIGH",
            AgentConfidence::Medium => "MEDIUM",
            AgentConfidence::Low => "LOW",
        }
    }
}

impl fmt::Display for AgentConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentConfidence {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HIGH" => Ok(AgentConfidence::High),
            "MEDIUM" => Ok(AgentConfidence::Medium),
            "LOW" => Ok(AgentConfidence::Low),
            other => Err(AgentError::MalformedOutput(format!(
                "unknown confidence level: {other}"
            ))),
        }
    }
}

/// Structured result of one investigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFinding {
    pub application_id: String,
    pub application_name: String,
    pub confidence: AgentConfidence,
    pub reasoning: String,
    /// Free-form extras such as search terms tried.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl AgentFinding {
    pub fn is_not_found(&self) -> bool {
        self.application_id == NOT_FOUND_SENTINEL
    }
}

/// Everything an agent runtime needs for one module.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// System instructions, built from sanitized module fields.
    pub instructions: String,
    /// Opening user message.
    pub prompt: String,
    /// Repository root; tool access is confined beneath it.
    pub repo_root: PathBuf,
    /// Module directory relative to `repo_root`.
    pub module_path: String,
    pub limits: AgentLimits,
}

/// An autonomous investigator with bounded, read-only tool access.
///
/// Implementations enforce `request.limits` and release any tool sessions
/// before returning, on success and on failure.
#[async_trait]
pub trait InvestigativeAgent: Send + Sync {
    async fn investigate(&self, request: AgentRequest) -> Result<AgentFinding, AgentError>;
}
