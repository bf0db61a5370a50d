//! Airalo wire types and the flattened shapes handed to callers.

use provider_core::{ApiError, ApiResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

pub const MAX_QUANTITY: u32 = 50;
/// Airalo quotes partner prices in US dollars.
pub const PRICE_CURRENCY: &str = "USD";

/// Identifiers arrive as either JSON strings or numbers.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

fn optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match optional_id_string(deserializer)? {
        None => Ok(None),
        Some(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid quantity '{}'", text))),
    }
}

/// Prices are numbers in most payloads and strings in some.
fn optional_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected numeric price, got {}",
                other
            )))
        }
    };
    Decimal::from_str(text.trim())
        .or_else(|_| Decimal::from_scientific(text.trim()))
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid price '{}': {}", text, e)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountryEntry {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub country_code: Option<String>,
    #[serde(default)]
    pub operators: Vec<OperatorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OperatorEntry {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub operator_type: Option<String>,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PackageEntry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub slug: Option<String>,
    #[serde(rename = "package")]
    pub title: Option<String>,
    pub data: Option<String>,
    pub day: Option<u32>,
    #[serde(default, deserialize_with = "optional_price")]
    pub price: Option<Decimal>,
    pub short_info: Option<String>,
}

/// One purchasable data plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsimPackage {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub country: String,
    pub country_code: String,
    pub operator: String,
    pub package_type: String,
    /// As advertised, e.g. "3 GB" or "Unlimited".
    pub data_amount: String,
    pub validity_days: Option<u32>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: String,
    pub description: String,
}

impl EsimPackage {
    pub fn matches(&self, id_or_slug: &str) -> bool {
        self.id == id_or_slug || self.slug == id_or_slug
    }
}

/// Flatten the `countries -> operators -> packages` tree.
///
/// A package without a price is rejected; the rest of the documented
/// optionals fall back to neutral labels.
pub(crate) fn flatten_packages(countries: Vec<CountryEntry>) -> ApiResult<Vec<EsimPackage>> {
    let mut packages = Vec::new();

    for country in countries {
        let country_title = country.title.unwrap_or_else(|| "Unknown".to_string());
        let country_slug = country.slug.unwrap_or_else(|| country_title.to_lowercase());
        let country_code = country.country_code.unwrap_or_else(|| "XX".to_string());

        for operator in country.operators {
            let operator_title = operator.title.unwrap_or_else(|| "Airalo".to_string());
            let package_type = operator
                .operator_type
                .unwrap_or_else(|| "prepaid".to_string());

            for pkg in operator.packages {
                let price = pkg.price.ok_or_else(|| {
                    ApiError::InvalidResponse(format!("package {} has no price", pkg.id))
                })?;
                let data_amount = pkg.data.unwrap_or_default();
                let days = pkg.day.map(|d| d.to_string()).unwrap_or_default();

                let slug = pkg
                    .slug
                    .unwrap_or_else(|| format!("{}-{}-{}d", country_slug, data_amount, days));
                let title = pkg
                    .title
                    .unwrap_or_else(|| format!("{} {} - {} Days", country_title, data_amount, days));
                let description = pkg.short_info.unwrap_or_else(|| title.clone());

                packages.push(EsimPackage {
                    id: pkg.id,
                    slug,
                    title,
                    country: country_title.clone(),
                    country_code: country_code.clone(),
                    operator: operator_title.clone(),
                    package_type: package_type.clone(),
                    data_amount,
                    validity_days: pkg.day,
                    price,
                    currency: PRICE_CURRENCY.to_string(),
                    description,
                });
            }
        }
    }

    Ok(packages)
}

/// Order for one or more eSIMs of a single package.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseRequest {
    pub package_id: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_settings_name: Option<String>,
}

impl PurchaseRequest {
    pub fn new(package_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            package_id: package_id.into(),
            quantity,
            description: None,
            brand_settings_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.package_id.trim().is_empty() {
            return Err(ApiError::Validation("package_id must not be empty".to_string()));
        }
        if !(1..=MAX_QUANTITY).contains(&self.quantity) {
            return Err(ApiError::Validation(format!(
                "quantity must be between 1 and {}, got {}",
                MAX_QUANTITY, self.quantity
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimEntry {
    pub iccid: String,
    pub lpa: String,
    pub qrcode_url: String,
    pub matching_id: Option<String>,
    pub smdp_address: Option<String>,
    pub confirmation_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderEntry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub code: String,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub package_id: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    pub quantity: Option<u32>,
    #[serde(default, deserialize_with = "optional_price")]
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub sims: Vec<SimEntry>,
}

/// What a customer needs to install a purchased eSIM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsimActivation {
    pub iccid: String,
    pub lpa: String,
    pub qrcode_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smdp_address: Option<String>,
    /// Manual-entry string, `LPA:1$<smdp>$<matching id>` when both parts are known.
    pub activation_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_code: Option<String>,
}

impl EsimActivation {
    /// Activation for the first SIM of a created order.
    pub(crate) fn from_order(order: OrderEntry) -> ApiResult<Self> {
        let code = order.code;
        let sim = order.sims.into_iter().next().ok_or_else(|| {
            ApiError::InvalidResponse(format!("order {} contains no SIM", code))
        })?;

        let activation_code = match &sim.matching_id {
            Some(matching_id) if !sim.lpa.starts_with("LPA:") => {
                format!("LPA:1${}${}", sim.lpa, matching_id)
            }
            _ => sim.lpa.clone(),
        };

        Ok(Self {
            iccid: sim.iccid,
            lpa: sim.lpa,
            qrcode_url: sim.qrcode_url,
            smdp_address: sim.smdp_address,
            activation_code,
            confirmation_code: sim.confirmation_code,
            order_code: Some(code),
        })
    }
}

/// Remaining allowance on an installed eSIM. Fields are as reported.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimUsage {
    pub status: Option<String>,
    /// Megabytes left.
    pub remaining: Option<i64>,
    pub total: Option<i64>,
    pub expired_at: Option<String>,
    #[serde(default)]
    pub is_unlimited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsimOrder {
    pub id: String,
    pub code: String,
    pub package_id: Option<String>,
    pub quantity: Option<u32>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub created_at: Option<String>,
}

impl From<OrderEntry> for EsimOrder {
    fn from(order: OrderEntry) -> Self {
        Self {
            id: order.id,
            code: order.code,
            package_id: order.package_id,
            quantity: order.quantity,
            price: order.price,
            currency: order.currency,
            created_at: order.created_at,
        }
    }
}
