use provider_core::auth::{ClientCredentials, TokenEndpoint, TokenEnvelope};
use provider_core::config::{env_or, process_env, require_env};
use provider_core::ApiError;
use secrecy::Secret;

pub const DEFAULT_BASE_URL: &str = "https://partners-api.airalo.com";

/// Airalo partner API settings.
#[derive(Clone, Debug)]
pub struct AiraloConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub api_base_url: String,
}

impl AiraloConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = require_env(&lookup, "AIRALO_CLIENT_ID")?;
        let client_secret = require_env(&lookup, "AIRALO_CLIENT_SECRET")?;
        let api_base_url = env_or(&lookup, "AIRALO_BASE_URL", DEFAULT_BASE_URL);

        Ok(Self {
            client_id,
            client_secret: Secret::new(client_secret),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }

    /// Airalo wraps the token in `data` and takes no scope.
    pub fn token_endpoint(&self) -> TokenEndpoint {
        TokenEndpoint {
            url: format!("{}/v2/token", self.api_base_url),
            scope: None,
            envelope: TokenEnvelope::Data,
        }
    }
}
