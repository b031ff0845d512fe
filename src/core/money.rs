//! Money value type: a currency code paired with an exact decimal amount
//!
//! Amounts are always held in major units (pounds, dollars) unless a subunit
//! conversion is explicitly requested. All arithmetic is exact decimal; mixed
//! currency arithmetic is an error, never an implicit conversion.

use crate::core::currency::Currency;
use crate::core::error::{Result, TrackerError};
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Money {
    pub currency: Currency,
    pub amount: Decimal,
}

impl Money {
    pub fn new(currency: Currency, amount: Decimal) -> Self {
        Money { currency, amount }
    }

    pub fn zero(currency: Currency) -> Self {
        Money::new(currency, Decimal::ZERO)
    }

    /// Parses an amount expressed in pence and scales it to pounds.
    pub fn from_pence(pence: &str) -> Result<Self> {
        let amount = parse_amount(pence)?;
        Ok(Money::new(Currency::Gbp, amount / Decimal::ONE_HUNDRED))
    }

    /// Parses an amount expressed in cents and scales it to dollars.
    pub fn from_cents(cents: &str) -> Result<Self> {
        let amount = parse_amount(cents)?;
        Ok(Money::new(Currency::Usd, amount / Decimal::ONE_HUNDRED))
    }

    /// Parses an amount already expressed in pounds.
    pub fn from_pounds(pounds: &str) -> Result<Self> {
        Ok(Money::new(Currency::Gbp, parse_amount(pounds)?))
    }

    pub fn add(&self, other: &Money) -> Result<Money> {
        self.check_currency("add", other)?;
        Ok(Money::new(self.currency, self.amount + other.amount))
    }

    pub fn sub(&self, other: &Money) -> Result<Money> {
        self.check_currency("sub", other)?;
        Ok(Money::new(self.currency, self.amount - other.amount))
    }

    pub fn div(&self, other: &Money) -> Result<Money> {
        self.check_currency("div", other)?;
        if other.amount.is_zero() {
            return Err(TrackerError::DivideByZero);
        }
        Ok(Money::new(self.currency, self.amount / other.amount))
    }

    pub fn mul(&self, factor: Decimal) -> Money {
        Money::new(self.currency, self.amount * factor)
    }

    /// Amount in minor units (pence, cents).
    pub fn to_subunits(&self) -> Decimal {
        self.amount * Decimal::ONE_HUNDRED
    }

    /// Rescales an amount that arrived pre-scaled by 100.
    pub fn to_units(&self) -> Money {
        Money::new(self.currency, self.amount / Decimal::ONE_HUNDRED)
    }

    /// Amount rounded to 3 decimal places with the currency code, e.g. `217 GBP`.
    pub fn describe(&self) -> String {
        format!("{} {}", round_3dp(self.amount), self.currency)
    }

    fn check_currency(&self, op: &'static str, other: &Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(TrackerError::CurrencyMismatch {
                op,
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }
}

fn parse_amount(input: &str) -> Result<Decimal> {
    input.parse().map_err(|_| TrackerError::ParseAmount {
        input: input.to_string(),
    })
}

fn round_3dp(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// `((current - baseline) / baseline) * 100`; positive means a rise.
pub fn percent_change(baseline: Decimal, current: Decimal) -> Result<Decimal> {
    if baseline.is_zero() {
        return Err(TrackerError::ZeroBaseline);
    }
    Ok((current - baseline) / baseline * Decimal::ONE_HUNDRED)
}

/// Formats a percentage to 3 decimal places with a trailing `%`.
pub fn percent_desc(percent: Decimal) -> String {
    format!("{} %", round_3dp(percent))
}
