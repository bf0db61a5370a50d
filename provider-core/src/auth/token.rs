use super::clock::{Clock, SystemClock};
use super::grant::{request_token, ClientCredentials, TokenEndpoint};
use crate::error::ApiResult;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Bearer token together with the instant it stops being accepted.
#[derive(Clone)]
pub struct AccessToken {
    value: Secret<String>,
    expires_at: DateTime<Utc>,
    refresh_at: DateTime<Utc>,
}

impl AccessToken {
    /// Token that stays usable until `expires_at`.
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: Secret::new(value.into()),
            expires_at,
            refresh_at: expires_at,
        }
    }

    /// Token issued at `issued_at` and due for refresh `margin` before it expires.
    ///
    /// The margin is capped at half the lifetime, so a token that lives no
    /// longer than the margin is still reused for part of its life.
    pub fn issued(
        value: impl Into<String>,
        issued_at: DateTime<Utc>,
        lifetime: chrono::Duration,
        margin: Duration,
    ) -> Self {
        let expires_at = issued_at + lifetime;
        let margin = chrono::Duration::from_std(margin)
            .unwrap_or_else(|_| chrono::Duration::zero())
            .min(lifetime / 2);

        Self {
            value: Secret::new(value.into()),
            expires_at,
            refresh_at: expires_at - margin,
        }
    }

    pub fn secret(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn refresh_at(&self) -> DateTime<Utc> {
        self.refresh_at
    }

    /// True until the refresh point is reached.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.refresh_at
    }

    fn same_as(&self, other: &AccessToken) -> bool {
        self.expires_at == other.expires_at && self.secret() == other.secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("refresh_at", &self.refresh_at)
            .finish()
    }
}

/// Caches one provider token and refreshes it on demand.
///
/// The cache lock is held for the whole refresh, so callers arriving while a
/// token request is in flight wait for it and reuse its result instead of
/// issuing their own.
pub struct TokenManager {
    http: Client,
    endpoint: TokenEndpoint,
    credentials: ClientCredentials,
    clock: Arc<dyn Clock>,
    refresh_margin: Duration,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(http: Client, endpoint: TokenEndpoint, credentials: ClientCredentials) -> Self {
        Self {
            http,
            endpoint,
            credentials,
            clock: Arc::new(SystemClock),
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            cached: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    pub fn endpoint(&self) -> &TokenEndpoint {
        &self.endpoint
    }

    /// Return the cached token if it is still fresh, otherwise obtain a new one.
    pub async fn get_token(&self) -> ApiResult<AccessToken> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(self.clock.now()) {
                tracing::trace!(expires_at = %token.expires_at, "Reusing cached access token");
                return Ok(token.clone());
            }
            tracing::debug!(expires_at = %token.expires_at, "Cached access token expired");
        }

        self.refresh_locked(&mut cached).await
    }

    /// Replace a token the provider refused with a newly issued one.
    ///
    /// If another caller already replaced `rejected`, the replacement is reused.
    pub async fn refresh_after_rejection(&self, rejected: &AccessToken) -> ApiResult<AccessToken> {
        let mut cached = self.cached.lock().await;

        match cached.as_ref() {
            Some(current) if !current.same_as(rejected) => {
                if current.is_fresh(self.clock.now()) {
                    return Ok(current.clone());
                }
            }
            _ => {}
        }

        tracing::warn!(
            token_url = %self.endpoint.url,
            "Access token rejected by provider, refreshing"
        );
        *cached = None;
        self.refresh_locked(&mut cached).await
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn refresh_locked(&self, slot: &mut Option<AccessToken>) -> ApiResult<AccessToken> {
        *slot = None;

        let grant = request_token(&self.http, &self.endpoint, &self.credentials).await?;
        let token = AccessToken::issued(
            grant.access_token,
            self.clock.now(),
            chrono::Duration::seconds(grant.expires_in),
            self.refresh_margin,
        );

        tracing::info!(
            token_url = %self.endpoint.url,
            expires_at = %token.expires_at,
            refresh_at = %token.refresh_at,
            "Obtained access token"
        );

        *slot = Some(token.clone());
        Ok(token)
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.credentials.client_id)
            .field("refresh_margin", &self.refresh_margin)
            .finish()
    }
}
