//! Currency codes known to the tracker

use crate::core::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// All normalized prices are ultimately expressed in this currency.
pub const HOME_CURRENCY: Currency = Currency::Gbp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Gbp,
    Usd,
    Eur,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GBP" => Ok(Currency::Gbp),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(TrackerError::ParseCurrency(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_round_trip() {
        for currency in [Currency::Gbp, Currency::Usd, Currency::Eur] {
            assert_eq!(currency.code().parse::<Currency>().unwrap(), currency);
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = "JPY".parse::<Currency>().unwrap_err();
        assert!(matches!(err, TrackerError::ParseCurrency(code) if code == "JPY"));
    }
}
