//! SumUp request and response types.
//!
//! Wire structs mirror the provider JSON; public structs are what callers see.
//! Required provider fields are non-optional so a missing one fails decoding.

use crate::fees;
use chrono::{DateTime, Utc};
use provider_core::{ApiError, ApiResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Checkout lifecycle as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl CheckoutStatus {
    /// Paid, failed and expired checkouts never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, CheckoutStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckoutStatus::Pending => "PENDING",
            CheckoutStatus::Paid => "PAID",
            CheckoutStatus::Failed => "FAILED",
            CheckoutStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchase attempt.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub amount: Decimal,
    /// ISO-4217 code, e.g. "EUR".
    pub currency: String,
    pub description: String,
    /// Must be unique per attempt; see [`crate::reference::generate`].
    pub merchant_reference: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

impl CheckoutRequest {
    pub fn new(
        amount: Decimal,
        currency: impl Into<String>,
        description: impl Into<String>,
        merchant_reference: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            currency: currency.into(),
            description: description.into(),
            merchant_reference: merchant_reference.into(),
            customer_email: None,
            customer_phone: None,
        }
    }

    pub fn with_customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_customer_phone(mut self, phone: impl Into<String>) -> Self {
        self.customer_phone = Some(phone.into());
        self
    }

    /// Caller-side checks to run before creating the checkout.
    pub fn validate(&self) -> ApiResult<()> {
        let currency_ok =
            self.currency.len() == 3 && self.currency.chars().all(|c| c.is_ascii_uppercase());
        if !currency_ok {
            return Err(ApiError::Validation(format!(
                "currency '{}' is not an ISO-4217 code",
                self.currency
            )));
        }
        if self.merchant_reference.trim().is_empty() {
            return Err(ApiError::Validation(
                "merchant_reference must not be empty".to_string(),
            ));
        }
        if !fees::validate_minimum_amount(self.amount, &self.currency) {
            return Err(ApiError::Validation(format!(
                "amount {} {} is below the provider minimum of {}",
                self.amount,
                self.currency,
                fees::FeeSchedule::standard().minimum_for(&self.currency)
            )));
        }
        Ok(())
    }
}

/// Body of `POST /v0.1/checkouts`.
#[derive(Debug, Serialize)]
pub(crate) struct CheckoutPayload<'a> {
    pub checkout_reference: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: &'a str,
    pub pay_to_email: &'a str,
    pub description: &'a str,
    pub merchant_reference: &'a str,
    pub return_url: &'a str,
    pub cancel_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Link {
    pub href: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutLinks {
    pub checkout: Option<Link>,
    pub qr_code: Option<Link>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutResponse {
    pub id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub status: Option<CheckoutStatus>,
    pub checkout_reference: String,
    pub description: Option<String>,
    pub merchant_reference: Option<String>,
    #[serde(rename = "_links")]
    pub links: Option<CheckoutLinks>,
}

/// Provider-side payment session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkout {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub status: CheckoutStatus,
    pub checkout_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
}

impl Checkout {
    /// Map a provider checkout. `default_status` covers creation responses
    /// that omit the status; `None` makes the status mandatory.
    pub(crate) fn from_response(
        response: CheckoutResponse,
        default_status: Option<CheckoutStatus>,
    ) -> ApiResult<Self> {
        let status = response.status.or(default_status).ok_or_else(|| {
            ApiError::InvalidResponse(format!(
                "checkout {} has no status",
                response.checkout_reference
            ))
        })?;

        let (checkout_url, qr_code_url) = match response.links {
            Some(links) => (
                links.checkout.map(|l| l.href),
                links.qr_code.map(|l| l.href),
            ),
            None => (None, None),
        };

        Ok(Self {
            id: response
                .id
                .unwrap_or_else(|| response.checkout_reference.clone()),
            amount: response.amount,
            currency: response.currency,
            status,
            checkout_reference: response.checkout_reference,
            description: response.description,
            merchant_reference: response.merchant_reference,
            checkout_url,
            qr_code_url,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Successful,
    Pending,
    Failed,
    Cancelled,
    Refunded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CardSummary {
    pub last_4_digits: String,
    #[serde(rename = "type")]
    pub card_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionResponse {
    pub id: String,
    pub transaction_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
    pub merchant_reference: Option<String>,
    pub payment_type: Option<String>,
    pub card: Option<CardSummary>,
}

/// Settled or attempted payment from the provider's transaction history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub id: String,
    pub transaction_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
}

impl From<TransactionResponse> for TransactionRecord {
    fn from(tx: TransactionResponse) -> Self {
        let (card_last4, card_type) = match tx.card {
            Some(card) => (Some(card.last_4_digits), Some(card.card_type)),
            None => (None, None),
        };

        Self {
            id: tx.id,
            transaction_code: tx.transaction_code,
            amount: tx.amount,
            currency: tx.currency,
            status: tx.status,
            timestamp: tx.timestamp,
            merchant_reference: tx.merchant_reference,
            payment_type: tx.payment_type,
            card_last4,
            card_type,
        }
    }
}

/// Card entered by the customer. Number and CVV never appear in `Debug`.
#[derive(Clone, Serialize)]
pub struct PaymentCard {
    pub name: String,
    pub number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
}

impl fmt::Debug for PaymentCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last4: String = self
            .number
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        f.debug_struct("PaymentCard")
            .field("name", &self.name)
            .field("number", &format_args!("****{}", last4))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"***")
            .finish()
    }
}

/// Body of `PUT /v0.1/checkouts/{id}/complete`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentData {
    pub payment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<PaymentCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

impl PaymentData {
    pub fn card(card: PaymentCard) -> Self {
        Self {
            payment_type: "card".to_string(),
            card: Some(card),
            token: None,
            customer_id: None,
        }
    }

    /// Pay with a card previously tokenised for `customer_id`.
    pub fn saved_card(token: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self {
            payment_type: "card".to_string(),
            card: None,
            token: Some(token.into()),
            customer_id: Some(customer_id.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RefundPayload {
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
}

/// Outcome of a refund call. The provider body is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefundResult {
    pub transaction_id: String,
    /// `None` requested a full refund.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub requested_amount: Option<Decimal>,
    pub provider_response: serde_json::Value,
}
