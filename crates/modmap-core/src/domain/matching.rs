//! Resolution outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::module::DiscoveredModule;

/// Which phase produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Deterministic,
    Llm,
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::Deterministic => write!(f, "deterministic"),
            MatchSource::Llm => write!(f, "llm"),
        }
    }
}

/// A resolved module. Confidence is always in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub module: DiscoveredModule,
    pub app_id: String,
    pub app_name: String,
    pub confidence: f64,
    pub search_term: String,
    pub source: MatchSource,
    /// Agent explanation; present only for agent matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Match {
    pub fn deterministic(
        module: &DiscoveredModule,
        candidate: &Candidate,
        confidence: f64,
        search_term: impl Into<String>,
    ) -> Self {
        Self {
            module: module.clone(),
            app_id: candidate.id.clone(),
            app_name: candidate.name.clone(),
            confidence: confidence.clamp(0.0, 1.0),
            search_term: search_term.into(),
            source: MatchSource::Deterministic,
            reasoning: None,
        }
    }
}
