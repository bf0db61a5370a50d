use crate::config::AiraloConfig;
use crate::models::{
    flatten_packages, CountryEntry, EsimActivation, EsimOrder, EsimPackage, OrderEntry,
    PurchaseRequest, SimUsage,
};
use provider_core::auth::TokenManager;
use provider_core::config::Config;
use provider_core::error::Upstream;
use provider_core::http::{build_http_client, decode, AuthorizedClient};
use provider_core::{ApiError, ApiResult};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

const PROVIDER: &str = "Airalo";
const USER_AGENT: &str = concat!("esim-client/", env!("CARGO_PKG_VERSION"));

/// Airalo partner API client. Cheap to clone; clones share one token cache.
#[derive(Clone, Debug)]
pub struct EsimClient {
    api: AuthorizedClient,
}

impl EsimClient {
    pub fn new(config: &AiraloConfig, http: Client, tokens: Arc<TokenManager>) -> Self {
        let api = AuthorizedClient::new(
            http,
            config.api_base_url.clone(),
            tokens,
            Upstream::Provisioning,
            PROVIDER,
        );
        Self { api }
    }

    pub fn from_config(config: &AiraloConfig, settings: &Config) -> ApiResult<Self> {
        let http = build_http_client(settings.http_timeout(), USER_AGENT)?;
        let tokens = TokenManager::new(http.clone(), config.token_endpoint(), config.credentials())
            .with_refresh_margin(settings.token_refresh_margin());
        Ok(Self::new(config, http, Arc::new(tokens)))
    }

    /// Catalogue, optionally narrowed to one ISO country code.
    #[instrument(skip(self), fields(provider = PROVIDER))]
    pub async fn list_packages(&self, country_code: Option<&str>) -> ApiResult<Vec<EsimPackage>> {
        let path = match country_code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => format!(
                "/v2/packages?filter[country]={}",
                urlencoding::encode(&code.to_ascii_uppercase())
            ),
            None => "/v2/packages".to_string(),
        };

        let countries = match data_array(self.api.get(&path).await?) {
            Some(items) => decode::<Vec<CountryEntry>>(Value::Array(items), "package catalogue")?,
            None => {
                tracing::warn!(path = %path, "Package catalogue had no data array");
                return Ok(Vec::new());
            }
        };

        let packages = flatten_packages(countries)?;
        tracing::info!(
            country = country_code.unwrap_or("all"),
            count = packages.len(),
            "Listed eSIM packages"
        );
        Ok(packages)
    }

    /// Airalo has no single-package endpoint, so this scans the full catalogue.
    #[instrument(skip(self), fields(provider = PROVIDER))]
    pub async fn package_details(&self, id_or_slug: &str) -> ApiResult<EsimPackage> {
        self.list_packages(None)
            .await?
            .into_iter()
            .find(|pkg| pkg.matches(id_or_slug))
            .ok_or_else(|| ApiError::NotFound(format!("eSIM package '{}'", id_or_slug)))
    }

    #[instrument(skip(self, request), fields(provider = PROVIDER, package_id = %request.package_id))]
    pub async fn purchase(&self, request: &PurchaseRequest) -> ApiResult<EsimActivation> {
        request.validate()?;

        let body = self.api.post("/v2/orders", request).await?;
        let data = body
            .get("data")
            .cloned()
            .filter(|data| !data.is_null())
            .ok_or_else(|| ApiError::InvalidResponse("order response has no data".to_string()))?;
        let order: OrderEntry = decode(data, "create order")?;
        let activation = EsimActivation::from_order(order)?;

        tracing::info!(
            package_id = %request.package_id,
            quantity = request.quantity,
            order_code = activation.order_code.as_deref().unwrap_or_default(),
            iccid = %activation.iccid,
            "eSIM order placed"
        );

        Ok(activation)
    }

    #[instrument(skip(self), fields(provider = PROVIDER))]
    pub async fn sim_usage(&self, iccid: &str) -> ApiResult<SimUsage> {
        let path = format!("/v2/sims/{}/usage", urlencoding::encode(iccid));
        let body = self.api.get(&path).await?;
        let data = body
            .get("data")
            .cloned()
            .filter(|data| !data.is_null())
            .ok_or_else(|| ApiError::InvalidResponse(format!("usage for {} has no data", iccid)))?;

        decode(data, "sim usage")
    }

    #[instrument(skip(self), fields(provider = PROVIDER))]
    pub async fn list_orders(&self) -> ApiResult<Vec<EsimOrder>> {
        let orders = match data_array(self.api.get("/v2/orders").await?) {
            Some(items) => items
                .into_iter()
                .map(|item| decode::<OrderEntry>(item, "order").map(EsimOrder::from))
                .collect::<ApiResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        tracing::info!(count = orders.len(), "Listed eSIM orders");
        Ok(orders)
    }
}

/// The `data` member when it is an array.
fn data_array(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}
