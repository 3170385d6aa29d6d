//! Module discovery for modmap.
//!
//! Combines explicit build-system declarations at the repository root with a
//! depth-limited manifest scan, then deduplicates on `(path, ecosystem)`.
//! Implements [`modmap_core::ModuleSource`].

pub mod declarations;
mod error;
pub mod manifest;
pub mod override_file;
pub mod scanner;

use std::collections::BTreeSet;
use std::path::Path;

use modmap_core::{DiscoveredModule, ModuleKey, ModuleSource};
use tracing::debug;

pub use error::{DiscoveryError, Result};
pub use scanner::SKIP_DIRS;

/// Filesystem-backed module source.
#[derive(Debug, Clone)]
pub struct RepoDiscovery {
    skip_dirs: BTreeSet<String>,
}

impl Default for RepoDiscovery {
    fn default() -> Self {
        Self {
            skip_dirs: SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RepoDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additionally skip directories named `name`.
    pub fn skip(mut self, name: impl Into<String>) -> Self {
        self.skip_dirs.insert(name.into());
        self
    }

    fn in_skipped_dir(&self, path: &str) -> bool {
        path != "." && path.split('/').any(|part| self.skip_dirs.contains(part))
    }

    /// Discover the modules under `root`, scanning at most `max_depth` levels.
    pub fn discover_modules(&self, root: &Path, max_depth: usize) -> Result<Vec<DiscoveredModule>> {
        if !root.exists() {
            return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
        }
        let root = root.canonicalize().map_err(|source| DiscoveryError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let declared = declarations::declared_modules(&root);
        let scanned = scanner::scan(&root, max_depth, &self.skip_dirs);
        debug!(declared = declared.len(), scanned = scanned.len(), "discovery sources merged");

        let mut seen: BTreeSet<ModuleKey> = BTreeSet::new();
        let mut out = Vec::new();
        for module in declared.into_iter().map(|m| attach_override(&root, m)).chain(scanned) {
            if self.in_skipped_dir(&module.path) {
                continue;
            }
            if seen.insert(module.key()) {
                out.push(module);
            }
        }
        Ok(out)
    }
}

fn attach_override(root: &Path, module: DiscoveredModule) -> DiscoveredModule {
    match override_file::override_name(&root.join(&module.path)) {
        Some(name) => module.with_override(name),
        None => module,
    }
}

impl ModuleSource for RepoDiscovery {
    fn discover(&self, root: &Path, max_depth: usize) -> modmap_core::Result<Vec<DiscoveredModule>> {
        Ok(self.discover_modules(root, max_depth)?)
    }
}
