//! Registry candidates.

use serde::{Deserialize, Serialize};

/// One entry in the external application registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Opaque registry identifier.
    pub id: String,
    pub name: String,
    /// Registry language tag; may be empty or use registry-specific naming.
    #[serde(default)]
    pub language: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
        }
    }
}
