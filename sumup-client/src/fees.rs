use once_cell::sync::Lazy;
use rust_decimal::{Decimal, RoundingStrategy};

/// Processing fee and minimum checkout amounts for card payments.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    /// Fraction of the amount, 0.0275 for 2.75%.
    pub percentage: Decimal,
    /// Fixed part per currency; anything not listed pays `default_fixed`.
    pub fixed: Vec<(&'static str, Decimal)>,
    pub default_fixed: Decimal,
    pub minimums: Vec<(&'static str, Decimal)>,
    pub default_minimum: Decimal,
}

static STANDARD: Lazy<FeeSchedule> = Lazy::new(|| FeeSchedule {
    percentage: Decimal::new(275, 4),
    fixed: vec![("EUR", Decimal::new(25, 2))],
    default_fixed: Decimal::new(30, 2),
    minimums: ["USD", "EUR", "GBP", "CAD", "AUD"]
        .into_iter()
        .map(|code| (code, Decimal::ONE))
        .collect(),
    default_minimum: Decimal::ONE,
});

impl FeeSchedule {
    pub fn standard() -> &'static FeeSchedule {
        &STANDARD
    }

    pub fn fixed_for(&self, currency: &str) -> Decimal {
        lookup(&self.fixed, currency).unwrap_or(self.default_fixed)
    }

    pub fn minimum_for(&self, currency: &str) -> Decimal {
        lookup(&self.minimums, currency).unwrap_or(self.default_minimum)
    }

    /// `amount * percentage + fixed`, rounded half away from zero to cents.
    pub fn fee(&self, amount: Decimal, currency: &str) -> Decimal {
        (amount * self.percentage + self.fixed_for(currency))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn meets_minimum(&self, amount: Decimal, currency: &str) -> bool {
        amount >= self.minimum_for(currency)
    }
}

fn lookup(table: &[(&'static str, Decimal)], currency: &str) -> Option<Decimal> {
    table
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(currency))
        .map(|(_, value)| *value)
}

/// Fee the provider will charge on `amount`. Pure; no network call.
pub fn calculate_fees(amount: Decimal, currency: &str) -> Decimal {
    FeeSchedule::standard().fee(amount, currency)
}

pub fn validate_minimum_amount(amount: Decimal, currency: &str) -> bool {
    FeeSchedule::standard().meets_minimum(amount, currency)
}
