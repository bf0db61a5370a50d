//! Client-credentials grant against a provider token endpoint.

use crate::error::ApiError;
use reqwest::header::ACCEPT;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// Service identity presented to the token endpoint.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
        }
    }
}

/// Shape of a successful token response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEnvelope {
    /// `{"access_token": "...", "expires_in": 3600}`
    Flat,
    /// `{"data": {"access_token": "...", "expires_in": 3600}}`
    Data,
}

#[derive(Debug, Clone)]
pub struct TokenEndpoint {
    pub url: String,
    pub scope: Option<String>,
    pub envelope: TokenEnvelope,
}

/// Token as issued by the provider, before expiry is pinned to a clock.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenGrant {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope {
    data: TokenGrant,
}

pub(crate) async fn request_token(
    http: &Client,
    endpoint: &TokenEndpoint,
    credentials: &ClientCredentials,
) -> Result<TokenGrant, ApiError> {
    let mut form: Vec<(&str, &str)> = vec![
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.expose_secret().as_str()),
    ];
    if let Some(scope) = endpoint.scope.as_deref() {
        form.push(("scope", scope));
    }

    let response = http
        .post(&endpoint.url)
        .header(ACCEPT, "application/json")
        .form(&form)
        .send()
        .await
        .map_err(|e| ApiError::Authentication {
            status: e.status(),
            message: format!("token request failed: {}", e),
            payload: None,
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| ApiError::Authentication {
        status: Some(status),
        message: format!("token response could not be read: {}", e),
        payload: None,
    })?;

    tracing::debug!(status = %status, url = %endpoint.url, "Token endpoint response");

    if !status.is_success() {
        tracing::error!(
            status = %status,
            client_id = %credentials.client_id,
            "Token endpoint rejected client credentials"
        );
        return Err(ApiError::Authentication {
            status: Some(status),
            message: format!("token endpoint returned {}", status),
            payload: Some(body),
        });
    }

    parse_grant(&body, endpoint.envelope).map_err(|message| ApiError::Authentication {
        status: Some(status),
        message,
        payload: Some(body.clone()),
    })
}

fn parse_grant(body: &str, envelope: TokenEnvelope) -> Result<TokenGrant, String> {
    let grant = match envelope {
        TokenEnvelope::Flat => serde_json::from_str::<TokenGrant>(body),
        TokenEnvelope::Data => serde_json::from_str::<DataEnvelope>(body).map(|env| env.data),
    }
    .map_err(|e| format!("malformed token response: {}", e))?;

    if grant.access_token.trim().is_empty() {
        return Err("malformed token response: empty access_token".to_string());
    }
    if grant.expires_in <= 0 {
        return Err(format!(
            "malformed token response: non-positive expires_in {}",
            grant.expires_in
        ));
    }

    Ok(grant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_grant() {
        let grant = parse_grant(
            r#"{"access_token":"tok_1","expires_in":3600,"token_type":"Bearer"}"#,
            TokenEnvelope::Flat,
        )
        .unwrap();
        assert_eq!(grant.access_token, "tok_1");
        assert_eq!(grant.expires_in, 3600);
    }

    #[test]
    fn parses_data_envelope() {
        let grant = parse_grant(
            r#"{"data":{"access_token":"tok_2","expires_in":86400},"meta":{"message":"success"}}"#,
            TokenEnvelope::Data,
        )
        .unwrap();
        assert_eq!(grant.access_token, "tok_2");
    }

    #[test]
    fn rejects_wrong_envelope() {
        let result = parse_grant(
            r#"{"access_token":"tok_1","expires_in":3600}"#,
            TokenEnvelope::Data,
        );
        assert!(result.unwrap_err().contains("malformed"));
    }

    #[test]
    fn rejects_missing_or_invalid_fields() {
        assert!(parse_grant(r#"{"expires_in":3600}"#, TokenEnvelope::Flat).is_err());
        assert!(parse_grant(r#"{"access_token":"","expires_in":3600}"#, TokenEnvelope::Flat).is_err());
        assert!(parse_grant(r#"{"access_token":"t","expires_in":0}"#, TokenEnvelope::Flat).is_err());
        assert!(parse_grant("not json", TokenEnvelope::Flat).is_err());
    }

    #[test]
    fn credentials_debug_hides_secret() {
        let creds = ClientCredentials::new("client-id", "super-secret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("client-id"));
        assert!(!debug.contains("super-secret"));
    }
}
