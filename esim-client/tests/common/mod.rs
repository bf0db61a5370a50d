use chrono::{TimeZone, Utc};
use esim_client::{AiraloConfig, EsimClient};
use provider_core::auth::{ManualClock, TokenManager};
use secrecy::Secret;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Airalo token endpoint answering with the `data` envelope.
pub async fn mount_token_endpoint(server: &MockServer, expected_requests: u64) {
    Mock::given(method("POST"))
        .and(path("/v2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "token_type": "Bearer",
                "expires_in": 31622400,
                "access_token": "airalo_tok"
            },
            "meta": {"message": "success"}
        })))
        .expect(expected_requests)
        .mount(server)
        .await;
}

pub fn test_client(server: &MockServer) -> EsimClient {
    let config = AiraloConfig {
        client_id: "airalo_test_client".to_string(),
        client_secret: Secret::new("airalo_test_secret".to_string()),
        api_base_url: server.uri(),
    };
    let http = reqwest::Client::new();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ));
    let tokens = TokenManager::new(http.clone(), config.token_endpoint(), config.credentials())
        .with_clock(clock);
    EsimClient::new(&config, http, Arc::new(tokens))
}

pub fn catalogue() -> serde_json::Value {
    json!({
        "data": [
            {
                "slug": "united-states",
                "country_code": "US",
                "title": "United States",
                "operators": [
                    {
                        "id": 7,
                        "title": "Change",
                        "type": "local",
                        "packages": [
                            {"id": "change-7days-1gb", "package": "1 GB - 7 Days", "data": "1 GB", "day": 7, "price": 4.5, "short_info": "Data only"},
                            {"id": "change-30days-3gb", "package": "3 GB - 30 Days", "data": "3 GB", "day": 30, "price": 11}
                        ]
                    }
                ]
            },
            {
                "slug": "france",
                "country_code": "FR",
                "title": "France",
                "operators": [
                    {
                        "id": 9,
                        "title": "Bonjour Talk",
                        "type": "local",
                        "packages": [
                            {"id": "bonjour-talk-7days-1gb", "package": "1 GB - 7 Days", "data": "1 GB", "day": 7, "price": "4.50"}
                        ]
                    }
                ]
            }
        ],
        "links": {},
        "meta": {"message": "success"}
    })
}
