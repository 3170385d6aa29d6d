//! Hands unresolved modules to an investigative agent and folds the answers
//! back into [`Match`] values.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::agent::{AgentFinding, AgentRequest, InvestigativeAgent};
use super::context::{build_instructions, build_prompt, InvestigationContext};
use super::error::AgentError;
use crate::config::ResolverConfig;
use crate::domain::{Candidate, DiscoveredModule, Match, MatchSource};
use crate::metrics::METRICS;
use crate::obs;
use crate::scoring::rank;
use crate::search_term::extract_search_term;

/// Why a module was handed to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    BelowThreshold,
    Ambiguous,
}

impl FallbackReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackReason::BelowThreshold => "below_threshold",
            FallbackReason::Ambiguous => "ambiguous",
        }
    }
}

/// Terminal state of one agent investigation.
#[derive(Debug)]
pub enum FallbackOutcome {
    Resolved(Match),
    /// The agent confirmed there is no registry entry.
    NotFound { reasoning: String },
    /// Invocation failed; the module stays unresolved.
    Failed(AgentError),
}

impl FallbackOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FallbackOutcome::Resolved(_) => "resolved",
            FallbackOutcome::NotFound { .. } => "not_found",
            FallbackOutcome::Failed(_) => "failed",
        }
    }

    pub fn into_match(self) -> Option<Match> {
        match self {
            FallbackOutcome::Resolved(m) => Some(m),
            _ => None,
        }
    }
}

/// Map an agent finding onto the unified match type.
///
/// The sentinel identifier becomes `Ok(None)`. An empty identifier is a
/// contract violation.
pub fn reconcile(module: &DiscoveredModule, finding: AgentFinding) -> Result<Option<Match>, AgentError> {
    if finding.is_not_found() {
        return Ok(None);
    }
    let app_id = finding.application_id.trim();
    if app_id.is_empty() {
        return Err(AgentError::MalformedOutput(
            "application_id is empty".to_string(),
        ));
    }
    Ok(Some(Match {
        module: module.clone(),
        app_id: app_id.to_string(),
        app_name: finding.application_name,
        confidence: finding.confidence.score(),
        search_term: extract_search_term(module),
        source: MatchSource::Llm,
        reasoning: Some(finding.reasoning),
    }))
}

/// Drives the agent for modules the deterministic phase could not settle.
pub struct FallbackOrchestrator {
    agent: Arc<dyn InvestigativeAgent>,
    config: ResolverConfig,
    repo_root: PathBuf,
}

impl FallbackOrchestrator {
    pub fn new(
        agent: Arc<dyn InvestigativeAgent>,
        config: ResolverConfig,
        repo_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            agent,
            config,
            repo_root: repo_root.into(),
        }
    }

    /// Build the request the agent receives for `module`.
    pub fn request_for(
        &self,
        module: &DiscoveredModule,
        candidates: &[Candidate],
        siblings: &[Match],
        ambiguous: bool,
    ) -> AgentRequest {
        let term = extract_search_term(module);
        let ranked = rank(module, candidates, &term);
        let ctx = InvestigationContext {
            module,
            ranked: &ranked,
            siblings,
            ambiguous,
        };
        AgentRequest {
            instructions: build_instructions(&ctx, &self.config),
            prompt: build_prompt(module),
            repo_root: self.repo_root.clone(),
            module_path: module.path.clone(),
            limits: self.config.agent,
        }
    }

    /// Investigate one module. Never fails: agent errors become
    /// [`FallbackOutcome::Failed`].
    pub async fn investigate(
        &self,
        module: &DiscoveredModule,
        candidates: &[Candidate],
        siblings: &[Match],
        reason: FallbackReason,
    ) -> FallbackOutcome {
        let ambiguous = reason == FallbackReason::Ambiguous;
        let request = self.request_for(module, candidates, siblings, ambiguous);
        debug!(module = %module.name, chars = request.instructions.len(), "agent instructions assembled");

        obs::emit_fallback_started(&module.name, &module.path, reason.as_str());
        METRICS.inc_agent_invocations();
        let started = Instant::now();

        let settled = match self.agent.investigate(request).await {
            Ok(finding) => {
                let reasoning = finding.reasoning.clone();
                reconcile(module, finding).map(|hit| (hit, reasoning))
            }
            Err(err) => Err(err),
        };

        let outcome = match settled {
            Ok((Some(hit), _)) => {
                METRICS.inc_agent_matches();
                FallbackOutcome::Resolved(hit)
            }
            Ok((None, reasoning)) => FallbackOutcome::NotFound { reasoning },
            Err(err) => {
                METRICS.inc_agent_failures();
                obs::emit_fallback_error(&module.name, &err);
                FallbackOutcome::Failed(err)
            }
        };

        obs::emit_fallback_finished(
            &module.name,
            outcome.label(),
            started.elapsed().as_millis() as u64,
        );
        outcome
    }

    /// Investigate `modules` one at a time.
    ///
    /// Each invocation sees `resolved` plus every agent match produced before
    /// it in this pass. Output order follows input order.
    pub async fn investigate_all(
        &self,
        modules: &[(DiscoveredModule, FallbackReason)],
        candidates: &[Candidate],
        resolved: &[Match],
    ) -> Vec<(DiscoveredModule, FallbackOutcome)> {
        let mut siblings: Vec<Match> = resolved.to_vec();
        let mut out = Vec::with_capacity(modules.len());
        for (module, reason) in modules {
            let outcome = self.investigate(module, candidates, &siblings, *reason).await;
            if let FallbackOutcome::Resolved(m) = &outcome {
                siblings.push(m.clone());
            }
            out.push((module.clone(), outcome));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Manifest;
    use crate::fallback::agent::AgentConfidence;

    fn finding(id: &str, confidence: AgentConfidence) -> AgentFinding {
        AgentFinding {
            application_id: id.into(),
            application_name: "Orders".into(),
            confidence,
            reasoning: "README".into(),
            metadata: Default::default(),
        }
    }

    #[test]
    fn reconcile_maps_confidence() {
        let m = DiscoveredModule::new("com.acme:orders", "orders", Manifest::PomXml);
        let hit = reconcile(&m, finding("app-7", AgentConfidence::Medium))
            .unwrap()
            .unwrap();
        assert_eq!(hit.confidence, 0.80);
        assert_eq!(hit.source, MatchSource::Llm);
        assert_eq!(hit.search_term, "orders");
        assert_eq!(hit.reasoning.as_deref(), Some("README"));
    }

    #[test]
    fn reconcile_sentinel_is_absent() {
        let m = DiscoveredModule::new("x", ".", Manifest::GoMod);
        assert!(reconcile(&m, finding("NOT_FOUND", AgentConfidence::Low))
            .unwrap()
            .is_none());
    }

    #[test]
    fn reconcile_rejects_blank_id() {
        let m = DiscoveredModule::new("x", ".", Manifest::GoMod);
        let err = reconcile(&m, finding("  ", AgentConfidence::High)).unwrap_err();
        assert!(matches!(err, AgentError::MalformedOutput(_)));
    }
}
