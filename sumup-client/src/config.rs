use provider_core::auth::{ClientCredentials, TokenEndpoint, TokenEnvelope};
use provider_core::config::{env_or, process_env, require_env};
use provider_core::ApiError;
use secrecy::Secret;

pub const DEFAULT_BASE_URL: &str = "https://api.sumup.com";
pub const DEFAULT_SCOPE: &str = "payments";
pub const DEFAULT_REDIRECT_ORIGIN: &str = "http://localhost:3000";

/// SumUp API settings.
#[derive(Clone, Debug)]
pub struct SumUpConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// Merchant account that receives checkout funds.
    pub merchant_email: String,
    pub api_base_url: String,
    pub scope: String,
    pub return_url: String,
    pub cancel_url: String,
}

impl SumUpConfig {
    /// Load from the process environment.
    ///
    /// Client id, client secret and merchant email have no fallback; a
    /// missing value is a configuration error.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = require_env(&lookup, "SUMUP_CLIENT_ID")?;
        let client_secret = require_env(&lookup, "SUMUP_CLIENT_SECRET")?;
        let merchant_email = require_env(&lookup, "SUMUP_MERCHANT_EMAIL")?;

        let api_base_url = env_or(&lookup, "SUMUP_BASE_URL", DEFAULT_BASE_URL);
        let scope = env_or(&lookup, "SUMUP_SCOPE", DEFAULT_SCOPE);
        let origin = env_or(&lookup, "SUMUP_REDIRECT_ORIGIN", DEFAULT_REDIRECT_ORIGIN);
        let origin = origin.trim_end_matches('/');

        Ok(Self {
            client_id,
            client_secret: Secret::new(client_secret),
            merchant_email,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            scope,
            return_url: format!("{}/payment/success", origin),
            cancel_url: format!("{}/payment/cancel", origin),
        })
    }

    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }

    pub fn token_endpoint(&self) -> TokenEndpoint {
        TokenEndpoint {
            url: format!("{}/token", self.api_base_url),
            scope: Some(self.scope.clone()),
            envelope: TokenEnvelope::Flat,
        }
    }
}
