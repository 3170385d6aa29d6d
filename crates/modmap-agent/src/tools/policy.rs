//! Capability policy for agent tools: first match wins, default deny.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a tool touches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCapability {
    /// Read files and directory listings beneath the repository root.
    FileRead,
    /// Query the application registry.
    RegistrySearch,
}

impl fmt::Display for ToolCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolCapability::FileRead => write!(f, "file_read"),
            ToolCapability::RegistrySearch => write!(f, "registry_search"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyVerdict {
    Allowed,
    Denied { reason: String },
}

impl PolicyVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyVerdict::Allowed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolPolicyRule {
    Allow {
        capability: ToolCapability,
    },
    Deny {
        capability: ToolCapability,
        reason: String,
    },
}

impl ToolPolicyRule {
    fn capability(&self) -> &ToolCapability {
        match self {
            ToolPolicyRule::Allow { capability } | ToolPolicyRule::Deny { capability, .. } => {
                capability
            }
        }
    }

    fn verdict(&self) -> PolicyVerdict {
        match self {
            ToolPolicyRule::Allow { .. } => PolicyVerdict::Allowed,
            ToolPolicyRule::Deny { reason, .. } => PolicyVerdict::Denied {
                reason: reason.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolPolicy {
    pub rules: Vec<ToolPolicyRule>,
}

impl ToolPolicy {
    /// Denies everything.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: ToolPolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Repository reads and registry search; nothing else.
    pub fn investigation() -> Self {
        Self::empty()
            .with_rule(ToolPolicyRule::Allow {
                capability: ToolCapability::FileRead,
            })
            .with_rule(ToolPolicyRule::Allow {
                capability: ToolCapability::RegistrySearch,
            })
    }

    pub fn evaluate(&self, capability: &ToolCapability) -> PolicyVerdict {
        self.rules
            .iter()
            .find(|rule| rule.capability() == capability)
            .map(ToolPolicyRule::verdict)
            .unwrap_or_else(|| PolicyVerdict::Denied {
                reason: format!("no policy rule allows capability={capability}"),
            })
    }
}
