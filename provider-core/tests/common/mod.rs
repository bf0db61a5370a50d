use chrono::{TimeZone, Utc};
use provider_core::auth::{ClientCredentials, ManualClock, TokenEndpoint, TokenEnvelope, TokenManager};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{Request, Respond, ResponseTemplate};

pub const TEST_CLIENT_ID: &str = "cc_test_client";
pub const TEST_CLIENT_SECRET: &str = "cc_test_secret";

/// Token endpoint stand-in issuing `tok_1`, `tok_2`, ... on successive calls.
pub struct SequentialTokens {
    issued: AtomicUsize,
    expires_in: i64,
    delay: Duration,
}

impl SequentialTokens {
    pub fn new(expires_in: i64) -> Self {
        Self {
            issued: AtomicUsize::new(0),
            expires_in,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Respond for SequentialTokens {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200)
            .set_body_json(json!({
                "access_token": format!("tok_{}", n),
                "token_type": "Bearer",
                "expires_in": self.expires_in,
            }))
            .set_delay(self.delay)
    }
}

pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ))
}

pub fn token_manager(server_uri: &str, clock: Arc<ManualClock>) -> TokenManager {
    TokenManager::new(
        reqwest::Client::new(),
        TokenEndpoint {
            url: format!("{}/token", server_uri),
            scope: Some("payments".to_string()),
            envelope: TokenEnvelope::Flat,
        },
        ClientCredentials::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET),
    )
    .with_clock(clock)
    .with_refresh_margin(Duration::from_secs(30))
}
