//! Registry credentials.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use modmap_core::RegistryError;

pub const ENV_HOST_NAME: &str = "CONTRAST_HOST_NAME";
pub const ENV_API_KEY: &str = "CONTRAST_API_KEY";
pub const ENV_ORG_ID: &str = "CONTRAST_ORG_ID";
pub const ENV_USERNAME: &str = "CONTRAST_USERNAME";
pub const ENV_SERVICE_KEY: &str = "CONTRAST_SERVICE_KEY";
pub const ENV_AUTH_TOKEN: &str = "CONTRAST_AUTH_TOKEN";

/// Connection settings for the registry. `Debug` redacts secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub host_name: String,
    pub api_key: String,
    pub service_key: String,
    pub username: String,
    pub org_id: String,
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("host_name", &self.host_name)
            .field("api_key", &"***")
            .field("service_key", &"***")
            .field("username", &self.username)
            .field("org_id", &self.org_id)
            .finish()
    }
}

/// Split `base64(username:service_key)` into its parts.
pub fn decode_auth_token(token: &str) -> Result<(String, String), RegistryError> {
    let invalid = || {
        RegistryError::Config(format!("{ENV_AUTH_TOKEN} must be base64(username:service_key)"))
    };
    let bytes = STANDARD.decode(token.trim()).map_err(|_| invalid())?;
    let decoded = String::from_utf8(bytes).map_err(|_| invalid())?;
    match decoded.split_once(':') {
        Some((user, key)) if !user.is_empty() && !key.is_empty() => {
            Ok((user.to_string(), key.to_string()))
        }
        _ => Err(invalid()),
    }
}

impl RegistryConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, RegistryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `get`. Explicit username and service key take precedence
    /// over `CONTRAST_AUTH_TOKEN`. All missing variables are reported at once.
    pub fn from_lookup<F>(get: F) -> Result<Self, RegistryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let host_name = var(ENV_HOST_NAME);
        let api_key = var(ENV_API_KEY);
        let org_id = var(ENV_ORG_ID);
        let mut username = var(ENV_USERNAME);
        let mut service_key = var(ENV_SERVICE_KEY);
        let token = var(ENV_AUTH_TOKEN);

        if !token.is_empty() && (username.is_empty() || service_key.is_empty()) {
            (username, service_key) = decode_auth_token(&token)?;
        }

        let mut missing = Vec::new();
        if host_name.is_empty() {
            missing.push(ENV_HOST_NAME.to_string());
        }
        if api_key.is_empty() {
            missing.push(ENV_API_KEY.to_string());
        }
        if org_id.is_empty() {
            missing.push(ENV_ORG_ID.to_string());
        }
        if username.is_empty() || service_key.is_empty() {
            missing.push(format!("{ENV_AUTH_TOKEN} (or {ENV_USERNAME} + {ENV_SERVICE_KEY})"));
        }
        if !missing.is_empty() {
            return Err(RegistryError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            host_name,
            api_key,
            service_key,
            username,
            org_id,
        })
    }

    /// `Authorization` header value: `base64(username:service_key)`.
    pub fn authorization(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.service_key))
    }

    /// Scheme and host. A bare host name is served over HTTPS.
    pub fn base_url(&self) -> String {
        let host = self.host_name.trim_end_matches('/');
        if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        }
    }

    /// Organisation-scoped API root.
    pub fn api_root(&self) -> String {
        format!("{}/Contrast/api/ng/{}", self.base_url(), self.org_id)
    }
}
