use serde::{Deserialize, Serialize};

use crate::error::{CallError, Result};

/// Environment variable read when no access token is configured
pub const ACCESS_TOKEN_ENV_VAR: &str = "ACS_ACCESS_TOKEN";

/// Call automation API version sent with every request
pub const DEFAULT_API_VERSION: &str = "2023-10-15";

/// Connection settings for the call automation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Resource endpoint, e.g. https://contoso.communication.azure.com
    #[serde(default)]
    pub endpoint: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Bearer token (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_version: default_api_version(),
            access_token: None,
        }
    }
}

impl ClientConfig {
    /// Get the access token from config or environment variable
    pub fn access_token(&self) -> Result<String> {
        // Check config first
        if let Some(token) = self.access_token.clone() {
            return Ok(token);
        }

        // Fall back to environment variable
        std::env::var(ACCESS_TOKEN_ENV_VAR).map_err(|_| CallError::MissingCredentials {
            endpoint: self.endpoint.clone(),
            env_var: ACCESS_TOKEN_ENV_VAR.to_string(),
        })
    }

    /// Check that the endpoint is usable
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(CallError::ConfigError("client endpoint is not set".into()));
        }
        if !self.endpoint.starts_with("https://") && !self.endpoint.starts_with("http://") {
            return Err(CallError::ConfigError(format!(
                "client endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}
