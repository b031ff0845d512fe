//! Typed error taxonomy for the tracker core

use crate::core::currency::Currency;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("currency mismatch in {op}: {left} vs {right}")]
    CurrencyMismatch {
        op: &'static str,
        left: Currency,
        right: Currency,
    },

    #[error("could not parse amount from '{input}'")]
    ParseAmount { input: String },

    #[error("unknown currency code '{0}'")]
    ParseCurrency(String),

    #[error("could not parse date '{0}'")]
    ParseDate(String),

    #[error("division by zero")]
    DivideByZero,

    #[error("percent change baseline is zero")]
    ZeroBaseline,

    #[error("rate lookup {from}->{to} failed: {reason}")]
    RateLookup {
        from: Currency,
        to: Currency,
        reason: String,
    },

    #[error("no end-of-day records returned for {symbol}")]
    NoRecords { symbol: String },

    #[error("exchange not resolved for {symbol}")]
    UnresolvedExchange { symbol: String },

    #[error("price fetch for {symbol} failed: {reason}")]
    PriceFetch { symbol: String, reason: String },

    #[error("failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("secret '{name}' is not available")]
    Secret { name: String },

    #[error("holding for {stock_id} has no units")]
    EmptyHolding { stock_id: String },

    #[error("no stock record for id {stock_id}")]
    UnknownStock { stock_id: String },
}
