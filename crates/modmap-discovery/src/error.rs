use std::path::PathBuf;

use modmap_core::ResolveError;

/// Discovery failures. Only problems with the repository root itself are
/// errors; unreadable manifests and subdirectories are skipped.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("repository root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("repository root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<DiscoveryError> for ResolveError {
    fn from(err: DiscoveryError) -> Self {
        ResolveError::Discovery(err.to_string())
    }
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
