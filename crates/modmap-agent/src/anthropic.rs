//! Anthropic Messages API client.

use async_trait::async_trait;
use modmap_core::AgentError;
use modmap_registry::RegistryConfig;
use serde_json::json;
use tracing::debug;

use crate::config::{LlmConfig, LlmConfigError, LlmProvider};
use crate::message::{ModelReply, ModelRequest};
use crate::model::ModelClient;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Path of the Anthropic-compatible proxy on the registry host.
pub const PROXY_PATH: &str = "/api/llm-proxy/v2/anthropic";

const MAX_ERROR_BODY: usize = 500;

pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    extra_headers: Vec<(String, String)>,
}

impl AnthropicClient {
    /// Client for the public API.
    pub fn direct(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, AgentError> {
        Self::with_base_url(ANTHROPIC_BASE_URL, api_key, model)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("modmap-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AgentError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            extra_headers: Vec::new(),
        })
    }

    /// Client for the registry host's proxy, authenticated with registry credentials.
    pub fn via_proxy(registry: &RegistryConfig, model: impl Into<String>) -> Result<Self, AgentError> {
        let base = format!("{}{PROXY_PATH}", registry.base_url());
        let mut client = Self::with_base_url(base, registry.api_key.clone(), model)?;
        client.extra_headers = vec![
            ("API-Key".to_string(), registry.api_key.clone()),
            ("Authorization".to_string(), registry.authorization()),
        ];
        Ok(client)
    }

    /// Build the client `config` selects. The proxy provider needs `registry`.
    pub fn from_config(
        config: &LlmConfig,
        registry: Option<&RegistryConfig>,
    ) -> Result<Self, ClientSetupError> {
        match config.provider {
            LlmProvider::Anthropic => {
                let key = config.anthropic_api_key.as_deref().ok_or(
                    LlmConfigError::MissingCredential {
                        provider: LlmProvider::Anthropic,
                        variable: crate::config::ENV_ANTHROPIC_API_KEY,
                    },
                )?;
                Ok(Self::direct(key, &config.model)?)
            }
            LlmProvider::Contrast => {
                let registry = registry.ok_or(ClientSetupError::MissingRegistryConfig)?;
                Ok(Self::via_proxy(registry, &config.model)?)
            }
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientSetupError {
    #[error(transparent)]
    Config(#[from] LlmConfigError),

    #[error("contrast provider requires registry credentials")]
    MissingRegistryConfig,

    #[error(transparent)]
    Client(#[from] AgentError),
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelReply, AgentError> {
        let body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "system": request.system,
            "messages": request.messages,
            "tools": request.tools,
        });

        let mut builder = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json");
        for (name, value) in &self.extra_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!(model = %self.model, messages = request.messages.len(), "model request");
        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail: String = text.chars().take(MAX_ERROR_BODY).collect();
            let message = format!("model API returned {status}: {detail}");
            return Err(if status.as_u16() == 429 || status.is_server_error() {
                AgentError::Transport(message)
            } else {
                AgentError::Model(message)
            });
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::MalformedOutput(format!("undecodable model reply: {e}")))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
