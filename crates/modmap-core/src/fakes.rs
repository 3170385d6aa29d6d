//! In-memory collaborators for tests.
//!
//! `StaticModuleSource`, `StaticRegistry` and `ScriptedAgent` satisfy the core
//! traits without touching the filesystem or the network.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::discovery::ModuleSource;
use crate::domain::{Candidate, DiscoveredModule, RegistryError, Result};
use crate::fallback::{AgentError, AgentFinding, AgentRequest, InvestigativeAgent};
use crate::registry::RegistryClient;

// ---------------------------------------------------------------------------
// StaticModuleSource
// ---------------------------------------------------------------------------

/// Returns the same modules for any root. Records the requested depths.
#[derive(Debug, Default)]
pub struct StaticModuleSource {
    modules: Vec<DiscoveredModule>,
    depths: Mutex<Vec<usize>>,
}

impl StaticModuleSource {
    pub fn new(modules: Vec<DiscoveredModule>) -> Self {
        Self {
            modules,
            depths: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_depths(&self) -> Vec<usize> {
        self.depths.lock().unwrap().clone()
    }
}

impl ModuleSource for StaticModuleSource {
    fn discover(&self, _root: &Path, max_depth: usize) -> Result<Vec<DiscoveredModule>> {
        self.depths.lock().unwrap().push(max_depth);
        Ok(self.modules.clone())
    }
}

// ---------------------------------------------------------------------------
// StaticRegistry
// ---------------------------------------------------------------------------

/// Fixed candidate listing with call accounting.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    candidates: Vec<Candidate>,
    fail_listing: bool,
    list_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl StaticRegistry {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    /// A registry whose listing always fails.
    pub fn failing() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryClient for StaticRegistry {
    async fn list_candidates(&self) -> std::result::Result<Vec<Candidate>, RegistryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(RegistryError::Transport("connection refused".into()));
        }
        Ok(self.candidates.clone())
    }

    async fn search(&self, filter: &str) -> std::result::Result<Vec<Candidate>, RegistryError> {
        let needle = filter.to_lowercase();
        Ok(self
            .candidates
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn close(&self) -> std::result::Result<(), RegistryError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScriptedAgent
// ---------------------------------------------------------------------------

/// Replays queued results in order and records every request.
///
/// Once the script runs dry, further calls fail with [`AgentError::Model`].
#[derive(Debug, Default)]
pub struct ScriptedAgent {
    script: Mutex<VecDeque<std::result::Result<AgentFinding, AgentError>>>,
    requests: Mutex<Vec<AgentRequest>>,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, result: std::result::Result<AgentFinding, AgentError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl InvestigativeAgent for ScriptedAgent {
    async fn investigate(
        &self,
        request: AgentRequest,
    ) -> std::result::Result<AgentFinding, AgentError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Model("script exhausted".into())))
    }
}
