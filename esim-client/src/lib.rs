//! Airalo eSIM client.
//!
//! Package catalogue, ordering and usage lookups behind the same token
//! lifecycle as the payment client.

pub mod client;
pub mod config;
pub mod models;

pub use client::EsimClient;
pub use config::AiraloConfig;
pub use models::{EsimActivation, EsimOrder, EsimPackage, PurchaseRequest, SimUsage};
