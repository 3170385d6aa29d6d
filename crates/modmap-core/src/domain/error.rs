//! Error taxonomy for the resolution pipeline.
//!
//! "No match" is never an error: absent matches travel as `Option` or as an
//! unresolved partition entry. Only collaborator failures that the core cannot
//! recover from surface here.

/// Failures at the registry boundary. Propagated out of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry transport error: {0}")]
    Transport(String),

    #[error("registry returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("could not decode registry response: {0}")]
    Decode(String),

    #[error("registry configuration error: {0}")]
    Config(String),
}

/// Pipeline-level failures.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("module discovery failed: {0}")]
    Discovery(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid resolver configuration: {0}")]
    Config(String),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
