//! Model provider selection from `AGENT_MODEL`.

use std::fmt;
use std::str::FromStr;

pub const ENV_AGENT_MODEL: &str = "AGENT_MODEL";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// Model used when `AGENT_MODEL` is unset.
pub const DEFAULT_CONTRAST_MODEL: &str = "us.anthropic.claude-sonnet-4-5-20250929-v1:0";

pub const VALID_PROVIDERS: [&str; 2] = ["anthropic", "contrast"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LlmConfigError {
    #[error("AGENT_MODEL must use provider/model format, got {value:?}; valid providers: {}", VALID_PROVIDERS.join(", "))]
    InvalidFormat { value: String },

    #[error("unknown provider {provider:?} in AGENT_MODEL; valid providers: {}", VALID_PROVIDERS.join(", "))]
    UnknownProvider { provider: String },

    #[error("AGENT_MODEL must name a model after the provider prefix, got {value:?}")]
    MissingModel { value: String },

    #[error("{provider} provider requires {variable}")]
    MissingCredential {
        provider: LlmProvider,
        variable: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Anthropic Messages API, called directly.
    Anthropic,
    /// Anthropic-compatible proxy on the registry host, using registry credentials.
    Contrast,
}

impl LlmProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Contrast => "contrast",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = LlmConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(LlmProvider::Anthropic),
            "contrast" => Ok(LlmProvider::Contrast),
            other => Err(LlmConfigError::UnknownProvider {
                provider: other.to_string(),
            }),
        }
    }
}

/// Split `provider/model` into its parts. Only the first `/` separates them,
/// so model ids may themselves contain slashes.
pub fn parse_agent_model(value: &str) -> Result<(LlmProvider, String), LlmConfigError> {
    let Some((provider, model)) = value.split_once('/') else {
        return Err(LlmConfigError::InvalidFormat {
            value: value.to_string(),
        });
    };
    let provider: LlmProvider = provider.parse()?;
    let model = model.trim();
    if model.is_empty() {
        return Err(LlmConfigError::MissingModel {
            value: value.to_string(),
        });
    }
    Ok((provider, model.to_string()))
}

#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub anthropic_api_key: Option<String>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("anthropic_api_key", &self.anthropic_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, LlmConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, LlmConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let agent_model = get(ENV_AGENT_MODEL)
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        let (provider, model) = if agent_model.is_empty() {
            (LlmProvider::Contrast, DEFAULT_CONTRAST_MODEL.to_string())
        } else {
            parse_agent_model(&agent_model)?
        };

        let anthropic_api_key = get(ENV_ANTHROPIC_API_KEY)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if provider == LlmProvider::Anthropic && anthropic_api_key.is_none() {
            return Err(LlmConfigError::MissingCredential {
                provider,
                variable: ENV_ANTHROPIC_API_KEY,
            });
        }

        Ok(Self {
            provider,
            model,
            anthropic_api_key,
        })
    }
}
