use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Which family of upstream endpoint produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Payment,
    Provisioning,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication error: {message}")]
    Authentication {
        status: Option<StatusCode>,
        message: String,
        payload: Option<String>,
    },

    #[error("Payment error ({status}): {message}")]
    Payment { status: StatusCode, message: String },

    #[error("Provisioning error ({status}): {message}")]
    Provisioning { status: StatusCode, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Checkout {checkout_id} still {last_status} after polling deadline")]
    PollTimeout {
        checkout_id: String,
        last_status: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(anyhow::Error::new(err))
    }
}

impl ApiError {
    /// Build the error for a non-2xx answer from a payment or provisioning endpoint.
    pub fn upstream(kind: Upstream, status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            Upstream::Payment => ApiError::Payment { status, message },
            Upstream::Provisioning => ApiError::Provisioning { status, message },
        }
    }

    pub fn invalid_response(context: &str, err: serde_json::Error) -> Self {
        ApiError::InvalidResponse(format!("{}: {}", context, err))
    }

    /// HTTP status reported by the provider, when the failure came from one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Authentication { status, .. } => *status,
            ApiError::Payment { status, .. } | ApiError::Provisioning { status, .. } => {
                Some(*status)
            }
            ApiError::Network(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_maps_to_family_variant() {
        let err = ApiError::upstream(Upstream::Payment, StatusCode::BAD_REQUEST, "bad amount");
        assert!(matches!(err, ApiError::Payment { .. }));
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.to_string(), "Payment error (400 Bad Request): bad amount");

        let err = ApiError::upstream(Upstream::Provisioning, StatusCode::NOT_FOUND, "no sim");
        assert!(matches!(err, ApiError::Provisioning { .. }));
    }

    #[test]
    fn authentication_is_flagged() {
        let err = ApiError::Authentication {
            status: Some(StatusCode::UNAUTHORIZED),
            message: "token endpoint rejected credentials".to_string(),
            payload: Some(r#"{"error":"invalid_client"}"#.to_string()),
        };
        assert!(err.is_authentication());
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(!ApiError::Validation("x".to_string()).is_authentication());
    }
}
