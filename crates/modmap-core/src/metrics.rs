//! Global atomic counters for resolution runs.
//!
//! Every increment emits a `trace!`; [`Metrics::flush`] emits the totals as a
//! single `info!` event at the end of a pipeline run.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    modules_scored: AtomicU64,
    deterministic_matches: AtomicU64,
    agent_invocations: AtomicU64,
    agent_matches: AtomicU64,
    agent_failures: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            modules_scored: AtomicU64::new(0),
            deterministic_matches: AtomicU64::new(0),
            agent_invocations: AtomicU64::new(0),
            agent_matches: AtomicU64::new(0),
            agent_failures: AtomicU64::new(0),
        }
    }

    pub fn add_modules_scored(&self, n: u64) {
        self.modules_scored.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "modules_scored", by = n, "counter incremented");
    }

    pub fn inc_deterministic_matches(&self) {
        self.deterministic_matches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "deterministic_matches", "counter incremented");
    }

    pub fn inc_agent_invocations(&self) {
        self.agent_invocations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "agent_invocations", "counter incremented");
    }

    pub fn inc_agent_matches(&self) {
        self.agent_matches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "agent_matches", "counter incremented");
    }

    pub fn inc_agent_failures(&self) {
        self.agent_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "agent_failures", "counter incremented");
    }

    /// Emit all counters as one `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            modules_scored = self.modules_scored(),
            deterministic_matches = self.deterministic_matches(),
            agent_invocations = self.agent_invocations(),
            agent_matches = self.agent_matches(),
            agent_failures = self.agent_failures(),
        );
    }

    pub fn modules_scored(&self) -> u64 {
        self.modules_scored.load(Ordering::Relaxed)
    }

    pub fn deterministic_matches(&self) -> u64 {
        self.deterministic_matches.load(Ordering::Relaxed)
    }

    pub fn agent_invocations(&self) -> u64 {
        self.agent_invocations.load(Ordering::Relaxed)
    }

    pub fn agent_matches(&self) -> u64 {
        self.agent_matches.load(Ordering::Relaxed)
    }

    pub fn agent_failures(&self) -> u64 {
        self.agent_failures.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.modules_scored.store(0, Ordering::Relaxed);
        self.deterministic_matches.store(0, Ordering::Relaxed);
        self.agent_invocations.store(0, Ordering::Relaxed);
        self.agent_matches.store(0, Ordering::Relaxed);
        self.agent_failures.store(0, Ordering::Relaxed);
    }
}
