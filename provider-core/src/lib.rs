//! provider-core: Shared infrastructure for third-party payment and provisioning clients.
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;

pub use error::{ApiError, ApiResult};

pub use reqwest;
pub use secrecy;
pub use serde_json;
pub use tracing;
