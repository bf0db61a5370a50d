mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use cli::{CheckoutArgs, Cli, Command, CompleteArgs, EsimCommand};
use esim_client::{AiraloConfig, EsimClient, PurchaseRequest};
use provider_core::config::Config;
use provider_core::observability::{init_tracing, shutdown_tracing};
use serde::Serialize;
use std::time::Duration;
use sumup_client::{
    calculate_fees, reference, validate_minimum_amount, wait_for_terminal, CheckoutRequest,
    PaymentCard, PaymentData, PollPolicy, SumUpClient, SumUpConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Config::load().context("Failed to load configuration")?;
    init_tracing("checkout-cli", &settings)?;

    let result = run(cli.command, &settings).await;
    shutdown_tracing();
    result
}

async fn run(command: Command, settings: &Config) -> anyhow::Result<()> {
    match command {
        Command::Fees { amount, currency } => {
            let fee = calculate_fees(amount, &currency);
            let meets_minimum = validate_minimum_amount(amount, &currency);
            print_json(&serde_json::json!({
                "amount": amount.to_string(),
                "currency": currency,
                "fee": fee.to_string(),
                "meets_minimum": meets_minimum,
            }))
        }
        Command::Esim(command) => {
            let config = AiraloConfig::from_env()?;
            let client = EsimClient::from_config(&config, settings)?;
            run_esim(&client, command).await
        }
        command => {
            let config = SumUpConfig::from_env()?;
            let client = SumUpClient::from_config(config, settings)?;
            run_sumup(&client, command).await
        }
    }
}

async fn run_sumup(client: &SumUpClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Checkout(args) => {
            let request = checkout_request(args);
            request.validate()?;
            print_json(&client.create_checkout(&request).await?)
        }
        Command::Status { checkout_id } => {
            print_json(&client.get_checkout_status(&checkout_id).await?)
        }
        Command::Wait(args) => {
            let policy = PollPolicy {
                interval: Duration::from_secs(args.interval_secs),
                timeout: Duration::from_secs(args.timeout_secs),
            };
            print_json(&wait_for_terminal(client, &args.checkout_id, policy).await?)
        }
        Command::Transactions { limit } => print_json(&client.list_transactions(limit).await?),
        Command::Complete(args) => {
            let checkout_id = args.checkout_id.clone();
            let payment = payment_data(args)?;
            print_json(&client.complete_payment(&checkout_id, &payment).await?)
        }
        Command::Refund {
            transaction_id,
            amount,
        } => print_json(&client.refund(&transaction_id, amount).await?),
        Command::Fees { .. } | Command::Esim(_) => bail!("not a SumUp command"),
    }
}

async fn run_esim(client: &EsimClient, command: EsimCommand) -> anyhow::Result<()> {
    match command {
        EsimCommand::Packages { country } => {
            print_json(&client.list_packages(country.as_deref()).await?)
        }
        EsimCommand::Package { id_or_slug } => {
            print_json(&client.package_details(&id_or_slug).await?)
        }
        EsimCommand::Purchase {
            package_id,
            quantity,
            description,
        } => {
            let mut request = PurchaseRequest::new(package_id, quantity);
            if let Some(description) = description {
                request = request.with_description(description);
            }
            print_json(&client.purchase(&request).await?)
        }
        EsimCommand::Usage { iccid } => print_json(&client.sim_usage(&iccid).await?),
        EsimCommand::Orders => print_json(&client.list_orders().await?),
    }
}

fn checkout_request(args: CheckoutArgs) -> CheckoutRequest {
    let merchant_reference = args
        .reference
        .unwrap_or_else(|| reference::generate(&args.reference_prefix));

    let mut request = CheckoutRequest::new(
        args.amount,
        args.currency.to_ascii_uppercase(),
        args.description,
        merchant_reference,
    );
    if let Some(email) = args.email {
        request = request.with_customer_email(email);
    }
    if let Some(phone) = args.phone {
        request = request.with_customer_phone(phone);
    }
    request
}

fn payment_data(args: CompleteArgs) -> anyhow::Result<PaymentData> {
    if let (Some(token), Some(customer_id)) = (args.token, args.customer_id) {
        return Ok(PaymentData::saved_card(token, customer_id));
    }

    match (
        args.card_name,
        args.card_number,
        args.expiry_month,
        args.expiry_year,
        args.cvv,
    ) {
        (Some(name), Some(number), Some(expiry_month), Some(expiry_year), Some(cvv)) => {
            Ok(PaymentData::card(PaymentCard {
                name,
                number,
                expiry_month,
                expiry_year,
                cvv,
            }))
        }
        _ => bail!("either --card-name with full card details or --token with --customer-id is required"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{}", out);
    Ok(())
}
