use chrono::{TimeZone, Utc};
use provider_core::auth::{ManualClock, TokenManager};
use secrecy::Secret;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sumup_client::{SumUpClient, SumUpConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const MERCHANT_EMAIL: &str = "merchant@example.com";

/// Issues `tok_1`, `tok_2`, ... on successive token requests.
pub struct SequentialTokens {
    issued: AtomicUsize,
}

impl SequentialTokens {
    pub fn new() -> Self {
        Self {
            issued: AtomicUsize::new(0),
        }
    }
}

impl Respond for SequentialTokens {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200).set_body_json(json!({
            "access_token": format!("tok_{}", n),
            "token_type": "Bearer",
            "expires_in": 3600,
        }))
    }
}

pub async fn mount_token_endpoint(server: &MockServer, expected_requests: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(SequentialTokens::new())
        .expect(expected_requests)
        .mount(server)
        .await;
}

pub fn test_config(server_uri: &str) -> SumUpConfig {
    SumUpConfig {
        client_id: "cc_test_client".to_string(),
        client_secret: Secret::new("cc_test_secret".to_string()),
        merchant_email: MERCHANT_EMAIL.to_string(),
        api_base_url: server_uri.to_string(),
        scope: "payments".to_string(),
        return_url: "http://localhost:3000/payment/success".to_string(),
        cancel_url: "http://localhost:3000/payment/cancel".to_string(),
    }
}

pub fn test_client(server: &MockServer) -> SumUpClient {
    let config = test_config(&server.uri());
    let http = reqwest::Client::new();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ));
    let tokens = TokenManager::new(http.clone(), config.token_endpoint(), config.credentials())
        .with_clock(clock);
    SumUpClient::new(config, http, Arc::new(tokens))
}
