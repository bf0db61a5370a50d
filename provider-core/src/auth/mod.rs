//! OAuth2 client-credentials token lifecycle.
//!
//! A [`TokenManager`] owns the only cached bearer token for one provider and
//! is shared by every outbound call made against that provider.

pub mod clock;
pub mod grant;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use grant::{ClientCredentials, TokenEndpoint, TokenEnvelope};
pub use token::{AccessToken, TokenManager};
