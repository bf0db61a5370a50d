//! SumUp REST client.
//!
//! Each operation is one authenticated call through [`AuthorizedClient`]; the
//! 401 refresh-and-retry lives there, not here.

use crate::config::SumUpConfig;
use crate::models::{
    Checkout, CheckoutPayload, CheckoutRequest, CheckoutResponse, CheckoutStatus, PaymentData,
    RefundPayload, RefundResult, TransactionRecord, TransactionResponse,
};
use crate::poller::CheckoutStatusSource;
use async_trait::async_trait;
use provider_core::auth::TokenManager;
use provider_core::config::Config;
use provider_core::error::Upstream;
use provider_core::http::{build_http_client, decode, AuthorizedClient};
use provider_core::{ApiError, ApiResult};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

const PROVIDER: &str = "SumUp";
const USER_AGENT: &str = concat!("sumup-client/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_DESCRIPTION: &str = "eSIM Package Purchase";
pub const DEFAULT_TRANSACTION_LIMIT: u32 = 10;

#[derive(Clone, Debug)]
pub struct SumUpClient {
    api: AuthorizedClient,
    config: SumUpConfig,
}

impl SumUpClient {
    /// Build a client around an existing HTTP client and token cache.
    pub fn new(config: SumUpConfig, http: Client, tokens: Arc<TokenManager>) -> Self {
        let api = AuthorizedClient::new(
            http,
            config.api_base_url.clone(),
            tokens,
            Upstream::Payment,
            PROVIDER,
        );
        Self { api, config }
    }

    /// Build the HTTP client and token cache from process settings.
    pub fn from_config(config: SumUpConfig, settings: &Config) -> ApiResult<Self> {
        let http = build_http_client(settings.http_timeout(), USER_AGENT)?;
        let tokens = TokenManager::new(http.clone(), config.token_endpoint(), config.credentials())
            .with_refresh_margin(settings.token_refresh_margin());
        Ok(Self::new(config, http, Arc::new(tokens)))
    }

    pub fn config(&self) -> &SumUpConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        self.api.tokens()
    }

    /// Open a hosted checkout for one purchase attempt.
    ///
    /// The amount is not checked against the provider minimum here; call
    /// [`CheckoutRequest::validate`] first.
    #[instrument(skip(self, request), fields(provider = PROVIDER, reference = %request.merchant_reference))]
    pub async fn create_checkout(&self, request: &CheckoutRequest) -> ApiResult<Checkout> {
        let description = if request.description.trim().is_empty() {
            DEFAULT_DESCRIPTION
        } else {
            request.description.as_str()
        };

        let payload = CheckoutPayload {
            checkout_reference: &request.merchant_reference,
            amount: request.amount,
            currency: &request.currency,
            pay_to_email: &self.config.merchant_email,
            description,
            merchant_reference: &request.merchant_reference,
            return_url: &self.config.return_url,
            cancel_url: &self.config.cancel_url,
            customer_email: request.customer_email.as_deref(),
            customer_phone: request.customer_phone.as_deref(),
        };

        let body = self.api.post("/v0.1/checkouts", &payload).await?;
        let response: CheckoutResponse = decode(body, "create checkout")?;
        let checkout = Checkout::from_response(response, Some(CheckoutStatus::Pending))?;

        tracing::info!(
            checkout_id = %checkout.id,
            checkout_reference = %checkout.checkout_reference,
            amount = %checkout.amount,
            currency = %checkout.currency,
            status = %checkout.status,
            "Checkout created"
        );

        Ok(checkout)
    }

    #[instrument(skip(self), fields(provider = PROVIDER))]
    pub async fn get_checkout_status(&self, checkout_id: &str) -> ApiResult<Checkout> {
        let path = format!("/v0.1/checkouts/{}", urlencoding::encode(checkout_id));
        let body = self.api.get(&path).await?;
        let response: CheckoutResponse = decode(body, "checkout status")?;
        let checkout = Checkout::from_response(response, None)?;

        tracing::debug!(
            checkout_id = %checkout.id,
            status = %checkout.status,
            "Fetched checkout status"
        );

        Ok(checkout)
    }

    /// Most recent transactions, newest first as the provider returns them.
    ///
    /// Anything other than a JSON array is treated as "no transactions".
    #[instrument(skip(self), fields(provider = PROVIDER))]
    pub async fn list_transactions(&self, limit: u32) -> ApiResult<Vec<TransactionRecord>> {
        let path = format!("/v0.1/me/transactions?limit={}", limit);
        let body = self.api.get(&path).await?;

        let items = match body {
            Value::Array(items) => items,
            other => {
                tracing::warn!(
                    body_type = json_type(&other),
                    "Transaction history was not an array, returning no transactions"
                );
                return Ok(Vec::new());
            }
        };

        let records = items
            .into_iter()
            .map(|item| decode::<TransactionResponse>(item, "transaction").map(TransactionRecord::from))
            .collect::<ApiResult<Vec<_>>>()?;

        tracing::info!(count = records.len(), limit, "Listed transactions");
        Ok(records)
    }

    #[instrument(skip(self, payment), fields(provider = PROVIDER))]
    pub async fn complete_payment(
        &self,
        checkout_id: &str,
        payment: &PaymentData,
    ) -> ApiResult<TransactionRecord> {
        let path = format!("/v0.1/checkouts/{}/complete", urlencoding::encode(checkout_id));
        let body = self.api.put(&path, payment).await?;
        let record = TransactionRecord::from(decode::<TransactionResponse>(body, "complete payment")?);

        tracing::info!(
            checkout_id = %checkout_id,
            transaction_id = %record.id,
            transaction_code = %record.transaction_code,
            status = ?record.status,
            "Payment completed"
        );

        Ok(record)
    }

    /// Refund a transaction. `None` refunds the full amount; a partial amount
    /// must be positive.
    #[instrument(skip(self), fields(provider = PROVIDER))]
    pub async fn refund(
        &self,
        transaction_id: &str,
        amount: Option<Decimal>,
    ) -> ApiResult<RefundResult> {
        if let Some(amount) = amount.filter(|amount| *amount <= Decimal::ZERO) {
            return Err(ApiError::Validation(format!(
                "refund amount must be greater than zero, got {}",
                amount
            )));
        }

        let path = format!("/v0.1/me/refund/{}", urlencoding::encode(transaction_id));
        let body = self.api.post(&path, &RefundPayload { amount }).await?;

        tracing::info!(
            transaction_id = %transaction_id,
            amount = ?amount,
            "Refund accepted"
        );

        Ok(RefundResult {
            transaction_id: transaction_id.to_string(),
            requested_amount: amount,
            provider_response: body,
        })
    }
}

#[async_trait]
impl CheckoutStatusSource for SumUpClient {
    async fn checkout_status(&self, checkout_id: &str) -> ApiResult<Checkout> {
        self.get_checkout_status(checkout_id).await
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
