//! Discovery collaborator contract.

use std::path::Path;

use crate::domain::{DiscoveredModule, Result};

/// Produces the modules of a repository.
///
/// Implementations guarantee `(path, ecosystem)` uniqueness in the returned list.
pub trait ModuleSource: Send + Sync {
    fn discover(&self, root: &Path, max_depth: usize) -> Result<Vec<DiscoveredModule>>;
}
