//! Tuning knobs for resolution, threaded explicitly through every phase.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{ResolveError, Result};

/// Hard ceilings enforced around one agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentLimits {
    /// Maximum model requests per module.
    pub max_model_turns: u32,
    /// Maximum tool invocations per module.
    pub max_tool_calls: u32,
    /// History length above which trimming kicks in.
    pub max_history_messages: usize,
    /// Recent messages kept (besides the first) after trimming.
    pub history_keep_recent: usize,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_model_turns: 10,
            max_tool_calls: 15,
            max_history_messages: 20,
            history_keep_recent: 10,
        }
    }
}

/// Soft budget conveyed to the agent in its instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationBudget {
    pub max_file_reads: u32,
    pub max_registry_searches: u32,
}

impl Default for InvestigationBudget {
    fn default() -> Self {
        Self {
            max_file_reads: 3,
            max_registry_searches: 2,
        }
    }
}

/// Resolver configuration.
///
/// Use [`ResolverConfig::single`] for single-best identification and
/// [`ResolverConfig::batch`] for mapping every module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Minimum score to accept a deterministic match.
    pub confidence_threshold: f64,
    /// Score at which a competing candidate counts as strong.
    /// `None` disables ambiguity detection. Independent of the threshold.
    pub ambiguity_floor: Option<f64>,
    /// Ranked deterministic scores shown to the agent.
    pub top_candidates: usize,
    /// Discovery depth for single-best mode.
    pub single_depth: usize,
    /// Discovery depth for all-modules mode.
    pub batch_depth: usize,
    pub agent: AgentLimits,
    pub investigation: InvestigationBudget,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::batch()
    }
}

impl ResolverConfig {
    /// Single-shot identification: stricter threshold, ambiguity checked.
    pub fn single() -> Self {
        Self {
            confidence_threshold: 0.7,
            ambiguity_floor: Some(0.6),
            ..Self::batch()
        }
    }

    /// Module-level mapping: looser threshold, no ambiguity check.
    pub fn batch() -> Self {
        Self {
            confidence_threshold: 0.5,
            ambiguity_floor: None,
            top_candidates: 5,
            single_depth: 2,
            batch_depth: 4,
            agent: AgentLimits::default(),
            investigation: InvestigationBudget::default(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_ambiguity_floor(mut self, floor: Option<f64>) -> Self {
        self.ambiguity_floor = floor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ResolveError::Config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if let Some(floor) = self.ambiguity_floor {
            if !(0.0..=1.0).contains(&floor) {
                return Err(ResolveError::Config(format!(
                    "ambiguity_floor must be within [0, 1], got {floor}"
                )));
            }
            if floor >= self.confidence_threshold {
                warn!(
                    ambiguity_floor = floor,
                    confidence_threshold = self.confidence_threshold,
                    "ambiguity floor is not below the confidence threshold"
                );
            }
        }
        if self.agent.max_model_turns == 0 {
            return Err(ResolveError::Config(
                "agent.max_model_turns must be at least 1".into(),
            ));
        }
        if self.agent.history_keep_recent >= self.agent.max_history_messages {
            return Err(ResolveError::Config(format!(
                "agent.history_keep_recent ({}) must be below agent.max_history_messages ({})",
                self.agent.history_keep_recent, self.agent.max_history_messages
            )));
        }
        Ok(())
    }
}
