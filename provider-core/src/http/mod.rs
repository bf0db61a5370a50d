//! Authenticated JSON calls against a provider REST API.
//!
//! Every call takes a token from the shared [`TokenManager`], sends it as a
//! bearer header and, if the provider answers 401, refreshes the token once
//! and repeats the request once. No other retry is performed.

use crate::auth::{AccessToken, TokenManager};
use crate::error::{ApiError, ApiResult, Upstream};
use crate::observability::trace_headers;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Build the shared reqwest client used for both token and API calls.
pub fn build_http_client(timeout: Duration, user_agent: &str) -> ApiResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ApiError::ConfigError(anyhow::anyhow!("Failed to create HTTP client: {}", e)))
}

#[derive(Clone)]
pub struct AuthorizedClient {
    http: Client,
    base_url: String,
    tokens: Arc<TokenManager>,
    upstream: Upstream,
    provider: &'static str,
}

impl AuthorizedClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        tokens: Arc<TokenManager>,
        upstream: Upstream,
        provider: &'static str,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            tokens,
            upstream,
            provider,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// Issue one authenticated call and return the decoded JSON body.
    ///
    /// An empty 2xx body decodes to `Value::Null`.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<Value> {
        let url = self.url(path);

        let token = self.tokens.get_token().await?;
        let mut response = self.dispatch(method.clone(), &url, body, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                provider = self.provider,
                method = %method,
                url = %url,
                "Provider returned 401, retrying once with a refreshed token"
            );
            let token = self.tokens.refresh_after_rejection(&token).await?;
            response = self.dispatch(method.clone(), &url, body, &token).await?;
        }

        self.read_body(&method, &url, response).await
    }

    async fn dispatch<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        token: &AccessToken,
    ) -> ApiResult<Response> {
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(token.secret())
            .header(ACCEPT, "application/json")
            .headers(trace_headers());

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    async fn read_body(&self, method: &Method, url: &str, response: Response) -> ApiResult<Value> {
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(
            provider = self.provider,
            method = %method,
            url = %url,
            status = %status,
            "Provider response"
        );

        if !status.is_success() {
            let message = provider_message(&body)
                .unwrap_or_else(|| format!("{} API request failed", self.provider));
            tracing::error!(
                provider = self.provider,
                method = %method,
                url = %url,
                status = %status,
                message = %message,
                "Provider request failed"
            );
            return Err(ApiError::upstream(self.upstream, status, message));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::invalid_response(&format!("{} {}", method, url), e))
    }
}

impl std::fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("base_url", &self.base_url)
            .field("provider", &self.provider)
            .field("upstream", &self.upstream)
            .finish()
    }
}

/// Deserialize a provider payload into a typed entity.
///
/// Missing required fields fail here rather than surfacing as defaults.
pub fn decode<T: DeserializeOwned>(value: Value, context: &str) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::invalid_response(context, e))
}

/// Pull a human readable message out of a provider error body.
pub fn provider_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let candidates = [
        value.get("message"),
        value.get("error_message"),
        value.pointer("/meta/message"),
        value.pointer("/error/message"),
        value.get("error_description"),
    ];

    let message = candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string);
    message
}
