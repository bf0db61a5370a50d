//! SumUp payment client.
//!
//! Checkout creation and status, transaction history, payment completion and
//! refunds, all sharing one cached OAuth2 token.

pub mod client;
pub mod config;
pub mod fees;
pub mod models;
pub mod poller;
pub mod reference;

pub use client::SumUpClient;
pub use config::SumUpConfig;
pub use fees::{calculate_fees, validate_minimum_amount, FeeSchedule};
pub use models::{
    Checkout, CheckoutRequest, CheckoutStatus, PaymentCard, PaymentData, RefundResult,
    TransactionRecord, TransactionStatus,
};
pub use poller::{wait_for_terminal, CheckoutStatusSource, PollPolicy};
