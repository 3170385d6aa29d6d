//! Pipeline coordinator: discovery, deterministic phase, fallback phase.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ambiguity::is_ambiguous;
use crate::config::ResolverConfig;
use crate::discovery::ModuleSource;
use crate::domain::{Candidate, DiscoveredModule, Match, ModuleKey, Result};
use crate::fallback::{FallbackOrchestrator, FallbackOutcome, FallbackReason, InvestigativeAgent};
use crate::metrics::METRICS;
use crate::obs::{self, RunSpan};
use crate::registry::{fetch_snapshot, RegistryClient};
use crate::resolver::{best_candidate, resolve_module};
use crate::search_term::extract_search_term;

/// Why a module ended a batch run without a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The registry listing was empty.
    NoCandidates,
    /// Best score missed the threshold and no agent was configured.
    BelowThreshold,
    /// Contested match and no agent was configured.
    Ambiguous,
    /// The agent confirmed there is no registry entry.
    NotFound { reasoning: String },
    AgentFailed { error: String },
}

impl UnresolvedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnresolvedReason::NoCandidates => "no_candidates",
            UnresolvedReason::BelowThreshold => "below_threshold",
            UnresolvedReason::Ambiguous => "ambiguous",
            UnresolvedReason::NotFound { .. } => "not_found",
            UnresolvedReason::AgentFailed { .. } => "agent_failed",
        }
    }
}

impl From<FallbackReason> for UnresolvedReason {
    fn from(reason: FallbackReason) -> Self {
        match reason {
            FallbackReason::BelowThreshold => UnresolvedReason::BelowThreshold,
            FallbackReason::Ambiguous => UnresolvedReason::Ambiguous,
        }
    }
}

/// A module that reached a terminal state without a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unresolved {
    pub module: DiscoveredModule,
    #[serde(flatten)]
    pub reason: UnresolvedReason,
}

/// All-modules result. The three maps are disjoint and together hold every
/// discovered module exactly once.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub deterministic: BTreeMap<ModuleKey, Match>,
    pub agent: BTreeMap<ModuleKey, Match>,
    pub unresolved: BTreeMap<ModuleKey, Unresolved>,
    pub total: usize,
}

impl BatchOutcome {
    fn unresolve(&mut self, module: DiscoveredModule, reason: UnresolvedReason) {
        self.unresolved
            .insert(module.key(), Unresolved { module, reason });
    }

    pub fn matched(&self) -> usize {
        self.deterministic.len() + self.agent.len()
    }
}

/// Drives both resolution modes over injected collaborators.
pub struct Pipeline {
    source: Arc<dyn ModuleSource>,
    registry: Arc<dyn RegistryClient>,
    agent: Option<Arc<dyn InvestigativeAgent>>,
    config: ResolverConfig,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn ModuleSource>,
        registry: Arc<dyn RegistryClient>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            source,
            registry,
            agent: None,
            config,
        }
    }

    /// Enable the fallback phase.
    pub fn with_agent(mut self, agent: Arc<dyn InvestigativeAgent>) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn discover(&self, repo: &Path, depth: usize) -> Result<Vec<DiscoveredModule>> {
        let modules = self.source.discover(repo, depth)?;
        obs::emit_discovery_complete(modules.len(), depth);
        for m in &modules {
            debug!(name = %m.name, ecosystem = %m.ecosystem, path = %m.path, "discovered module");
        }
        Ok(modules)
    }

    fn orchestrator(&self, repo: &Path) -> Option<FallbackOrchestrator> {
        self.agent
            .as_ref()
            .map(|agent| FallbackOrchestrator::new(Arc::clone(agent), self.config.clone(), repo))
    }

    /// Contested unless the module carries an override or the check is disabled.
    fn contested(&self, module: &DiscoveredModule, candidates: &[Candidate]) -> bool {
        if module.has_override() {
            debug!(module = %module.name, "operator override present, skipping ambiguity check");
            return false;
        }
        match self.config.ambiguity_floor {
            Some(floor) => is_ambiguous(module, candidates, floor),
            None => false,
        }
    }

    /// Single-best mode: the one registry entry that best represents `repo`.
    ///
    /// Returns `Ok(None)` when nothing matches. Only registry and discovery
    /// failures are errors.
    pub async fn identify(&self, repo: &Path) -> Result<Option<Match>> {
        self.config.validate()?;
        let run_id = Uuid::new_v4().to_string();
        let _span = RunSpan::enter(&run_id, &repo.display().to_string());
        let started = Instant::now();

        let modules = self.discover(repo, self.config.single_depth)?;
        if modules.is_empty() {
            warn!(repo = %repo.display(), "no modules discovered");
            return Ok(None);
        }

        let candidates = fetch_snapshot(self.registry.as_ref()).await?;
        if candidates.is_empty() {
            warn!("registry returned no applications");
            return Ok(None);
        }
        METRICS.add_modules_scored(modules.len() as u64);

        let mut best: Option<Match> = None;
        for module in &modules {
            let term = extract_search_term(module);
            if let Some((candidate, score)) = best_candidate(module, &candidates, &term) {
                if best.as_ref().map_or(true, |b| score > b.confidence) {
                    best = Some(Match::deterministic(module, candidate, score, term));
                }
            }
        }

        let ambiguous = best
            .as_ref()
            .is_some_and(|b| self.contested(&b.module, &candidates));

        if let Some(hit) = &best {
            info!(
                module = %hit.module.name,
                app_name = %hit.app_name,
                confidence = hit.confidence,
                ambiguous = ambiguous,
                "best deterministic candidate"
            );
            if hit.confidence >= self.config.confidence_threshold && !ambiguous {
                METRICS.inc_deterministic_matches();
                obs::emit_deterministic_resolved(
                    &hit.module.path,
                    &hit.app_name,
                    hit.confidence,
                    &hit.search_term,
                );
                self.finish(started, modules.len(), 1, 0);
                return Ok(best);
            }
        }

        let result = match self.orchestrator(repo) {
            Some(orchestrator) => {
                let target = best.as_ref().map_or(&modules[0], |b| &b.module);
                let reason = if ambiguous {
                    FallbackReason::Ambiguous
                } else {
                    FallbackReason::BelowThreshold
                };
                orchestrator
                    .investigate(target, &candidates, &[], reason)
                    .await
                    .into_match()
            }
            None => None,
        };

        let agent_hits = usize::from(result.is_some());
        self.finish(started, modules.len(), 0, agent_hits);
        Ok(result)
    }

    /// All-modules mode: resolve every discovered module.
    pub async fn map_modules(&self, repo: &Path) -> Result<BatchOutcome> {
        self.config.validate()?;
        let run_id = Uuid::new_v4().to_string();
        let _span = RunSpan::enter(&run_id, &repo.display().to_string());
        let started = Instant::now();

        let modules = self.discover(repo, self.config.batch_depth)?;
        let mut outcome = BatchOutcome {
            total: modules.len(),
            ..BatchOutcome::default()
        };
        if modules.is_empty() {
            warn!(repo = %repo.display(), "no modules discovered");
            return Ok(outcome);
        }

        let candidates = fetch_snapshot(self.registry.as_ref()).await?;
        if candidates.is_empty() {
            warn!("registry returned no applications");
            for module in modules {
                outcome.unresolve(module, UnresolvedReason::NoCandidates);
            }
            self.finish(started, outcome.total, 0, 0);
            return Ok(outcome);
        }
        METRICS.add_modules_scored(modules.len() as u64);

        let mut pending: Vec<(DiscoveredModule, FallbackReason)> = Vec::new();
        for module in &modules {
            match resolve_module(module, &candidates, self.config.confidence_threshold) {
                Some(hit) if !self.contested(module, &candidates) => {
                    METRICS.inc_deterministic_matches();
                    obs::emit_deterministic_resolved(
                        &module.path,
                        &hit.app_name,
                        hit.confidence,
                        &hit.search_term,
                    );
                    outcome.deterministic.insert(module.key(), hit);
                }
                Some(_) => pending.push((module.clone(), FallbackReason::Ambiguous)),
                None => pending.push((module.clone(), FallbackReason::BelowThreshold)),
            }
        }
        info!(
            matched = outcome.deterministic.len(),
            pending = pending.len(),
            "deterministic phase complete"
        );

        match self.orchestrator(repo) {
            Some(orchestrator) if !pending.is_empty() => {
                let resolved: Vec<Match> = outcome.deterministic.values().cloned().collect();
                let results = orchestrator
                    .investigate_all(&pending, &candidates, &resolved)
                    .await;
                for (module, result) in results {
                    match result {
                        FallbackOutcome::Resolved(hit) => {
                            outcome.agent.insert(module.key(), hit);
                        }
                        FallbackOutcome::NotFound { reasoning } => {
                            outcome.unresolve(module, UnresolvedReason::NotFound { reasoning });
                        }
                        FallbackOutcome::Failed(err) => {
                            outcome.unresolve(
                                module,
                                UnresolvedReason::AgentFailed {
                                    error: err.to_string(),
                                },
                            );
                        }
                    }
                }
            }
            _ => {
                for (module, reason) in pending {
                    outcome.unresolve(module, reason.into());
                }
            }
        }

        self.finish(
            started,
            outcome.total,
            outcome.deterministic.len(),
            outcome.agent.len(),
        );
        Ok(outcome)
    }

    fn finish(&self, started: Instant, total: usize, deterministic: usize, agent: usize) {
        obs::emit_pipeline_complete(
            total,
            deterministic,
            agent,
            total.saturating_sub(deterministic + agent),
            started.elapsed().as_millis() as u64,
        );
        METRICS.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_reason_serializes_with_tag() {
        let json = serde_json::to_value(UnresolvedReason::AgentFailed {
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(json["reason"], "agent_failed");
        assert_eq!(json["error"], "boom");
        assert_eq!(UnresolvedReason::NoCandidates.as_str(), "no_candidates");
    }
}
