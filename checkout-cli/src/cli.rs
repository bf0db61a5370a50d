use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "checkout-cli", version, about = "SumUp checkouts and Airalo eSIM orders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a hosted checkout
    Checkout(CheckoutArgs),
    /// Show a checkout's current status
    Status { checkout_id: String },
    /// Poll a checkout until it is paid, failed or expired
    Wait(WaitArgs),
    /// List recent transactions
    Transactions {
        #[arg(long, default_value_t = sumup_client::client::DEFAULT_TRANSACTION_LIMIT)]
        limit: u32,
    },
    /// Pay a checkout with a card or a saved card token
    Complete(CompleteArgs),
    /// Refund a transaction, fully unless --amount is given
    Refund {
        transaction_id: String,
        #[arg(long)]
        amount: Option<Decimal>,
    },
    /// Show the processing fee and minimum check for an amount
    Fees {
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// eSIM catalogue and orders
    #[command(subcommand)]
    Esim(EsimCommand),
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long, default_value = "USD")]
    pub currency: String,
    #[arg(long, default_value = sumup_client::client::DEFAULT_DESCRIPTION)]
    pub description: String,
    /// Merchant reference; generated from --reference-prefix when omitted
    #[arg(long)]
    pub reference: Option<String>,
    #[arg(long, default_value = "esim")]
    pub reference_prefix: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Args)]
pub struct WaitArgs {
    pub checkout_id: String,
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: u64,
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}

#[derive(Debug, Args)]
pub struct CompleteArgs {
    pub checkout_id: String,
    #[arg(long, requires_all = ["card_number", "expiry_month", "expiry_year", "cvv"], conflicts_with = "token")]
    pub card_name: Option<String>,
    #[arg(long)]
    pub card_number: Option<String>,
    #[arg(long)]
    pub expiry_month: Option<String>,
    #[arg(long)]
    pub expiry_year: Option<String>,
    #[arg(long, env = "CARD_CVV", hide_env_values = true)]
    pub cvv: Option<String>,
    /// Saved card token
    #[arg(long, requires = "customer_id")]
    pub token: Option<String>,
    #[arg(long)]
    pub customer_id: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum EsimCommand {
    /// List packages, optionally for one country
    Packages {
        #[arg(long)]
        country: Option<String>,
    },
    /// Show one package by id or slug
    Package { id_or_slug: String },
    /// Order eSIMs for a package
    Purchase {
        package_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        description: Option<String>,
    },
    /// Remaining data on an installed eSIM
    Usage { iccid: String },
    /// List past orders
    Orders,
}
