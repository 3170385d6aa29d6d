//! Registry collaborator contract.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{Candidate, RegistryError};
use crate::obs;

/// Source of registry candidates.
///
/// `list_candidates` returns the complete listing; pagination is the
/// implementation's concern.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, RegistryError>;

    /// Filter-text search, used by the agent's registry tool.
    async fn search(&self, filter: &str) -> Result<Vec<Candidate>, RegistryError>;

    /// Release any session state. Called once per snapshot on every path.
    async fn close(&self) -> Result<(), RegistryError> {
        Ok(())
    }
}

/// Fetch the run's immutable candidate snapshot, then close the session.
///
/// A listing failure is returned after `close` has run. A close failure is
/// logged and does not mask a successful listing.
pub async fn fetch_snapshot(registry: &dyn RegistryClient) -> Result<Vec<Candidate>, RegistryError> {
    let listed = registry.list_candidates().await;
    if let Err(err) = registry.close().await {
        warn!(error = %err, "failed to close registry session");
    }
    let candidates = listed?;
    obs::emit_registry_snapshot(candidates.len());
    Ok(candidates)
}
