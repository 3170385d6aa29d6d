//! Structured lifecycle events for a resolution run.
//!
//! Every event is an `info!` (or `warn!`) record carrying an `event` field, so
//! JSON log output can be filtered on it directly.

use tracing::{info, warn};

/// RAII guard entering a run-scoped span.
///
/// ```ignore
/// let _span = RunSpan::enter(&run_id, "/src/shop");
/// // events below carry run_id and repo
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str, repo: &str) -> Self {
        let span = tracing::info_span!("modmap.run", run_id = %run_id, repo = %repo);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_discovery_complete(modules: usize, depth: usize) {
    info!(event = "discovery.complete", modules = modules, depth = depth);
}

/// Registry listing fetched for this run.
pub fn emit_registry_snapshot(candidates: usize) {
    info!(event = "registry.snapshot", candidates = candidates);
}

pub fn emit_deterministic_resolved(module: &str, app_name: &str, confidence: f64, term: &str) {
    info!(
        event = "deterministic.resolved",
        module = %module,
        app_name = %app_name,
        confidence = confidence,
        search_term = %term,
    );
}

/// The agent is about to investigate `module`.
pub fn emit_fallback_started(module: &str, path: &str, reason: &str) {
    info!(event = "fallback.started", module = %module, path = %path, reason = %reason);
}

/// Agent investigation finished. `outcome` is `resolved`, `not_found` or `failed`.
pub fn emit_fallback_finished(module: &str, outcome: &str, elapsed_ms: u64) {
    info!(
        event = "fallback.finished",
        module = %module,
        outcome = %outcome,
        elapsed_ms = elapsed_ms,
    );
}

pub fn emit_fallback_error(module: &str, error: &dyn std::fmt::Display) {
    warn!(event = "fallback.error", module = %module, error = %error);
}

pub fn emit_pipeline_complete(
    total: usize,
    deterministic: usize,
    agent: usize,
    unresolved: usize,
    elapsed_ms: u64,
) {
    info!(
        event = "pipeline.complete",
        total = total,
        deterministic = deterministic,
        agent = agent,
        unresolved = unresolved,
        elapsed_ms = elapsed_ms,
    );
}
