//! Wait for a checkout to leave `PENDING`.
//!
//! The client never polls on its own; callers that need to block until the
//! customer has paid drive this loop explicitly.

use crate::models::Checkout;
use async_trait::async_trait;
use provider_core::{ApiError, ApiResult};
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[async_trait]
pub trait CheckoutStatusSource: Send + Sync {
    async fn checkout_status(&self, checkout_id: &str) -> ApiResult<Checkout>;
}

#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    pub fn validate(&self) -> ApiResult<()> {
        if self.interval.is_zero() {
            return Err(ApiError::Validation(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Poll until the checkout is terminal or `policy.timeout` elapses.
///
/// Errors from the status call are returned immediately. A timeout too large
/// to represent as an instant means no deadline.
pub async fn wait_for_terminal<S>(
    source: &S,
    checkout_id: &str,
    policy: PollPolicy,
) -> ApiResult<Checkout>
where
    S: CheckoutStatusSource + ?Sized,
{
    policy.validate()?;

    let deadline = Instant::now().checked_add(policy.timeout);
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let checkout = source.checkout_status(checkout_id).await?;

        if checkout.is_terminal() {
            tracing::info!(
                checkout_id = %checkout_id,
                status = %checkout.status,
                attempts,
                "Checkout reached terminal status"
            );
            return Ok(checkout);
        }

        let next_poll = Instant::now().checked_add(policy.interval);
        let past_deadline = match (deadline, next_poll) {
            (None, _) => false,
            (Some(deadline), Some(next_poll)) => next_poll > deadline,
            (Some(_), None) => true,
        };
        if past_deadline {
            tracing::warn!(
                checkout_id = %checkout_id,
                status = %checkout.status,
                attempts,
                "Gave up waiting for checkout"
            );
            return Err(ApiError::PollTimeout {
                checkout_id: checkout_id.to_string(),
                last_status: checkout.status.to_string(),
            });
        }

        tracing::debug!(checkout_id = %checkout_id, attempts, "Checkout still pending");
        sleep(policy.interval).await;
    }
}
