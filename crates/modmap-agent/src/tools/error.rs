//! Tool execution errors. These are reported back to the model, not raised.

use std::path::PathBuf;

use modmap_core::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool {tool} denied: {reason}")]
    Denied { tool: String, reason: String },

    #[error("invalid input for {tool}: {reason}")]
    InvalidInput { tool: String, reason: String },

    #[error("path is outside the repository: {0}")]
    OutsideRoot(String),

    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry search failed: {0}")]
    Registry(#[from] RegistryError),
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;
