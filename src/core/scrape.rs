//! Boundary types for scraped broker quote pages
//!
//! Selector logic lives with an external scraping collaborator; this core
//! only consumes the raw strings it extracts.

use crate::core::error::Result;
use crate::core::stock::Stock;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Direction marker the page carries alongside the unsigned change digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Rising,
    Falling,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct ScrapedChange {
    /// Unsigned percent digits as scraped, e.g. `0.35`.
    pub digits: Decimal,
    pub direction: ChangeDirection,
}

impl ScrapedChange {
    pub fn signed(&self) -> Decimal {
        match self.direction {
            ChangeDirection::Rising => self.digits,
            ChangeDirection::Falling => -self.digits,
            ChangeDirection::Unchanged => Decimal::ZERO,
        }
    }
}

/// Raw price fragments from one broker page: the ask ("buy") and bid ("sell")
/// prices plus an optional reported percent change.
#[derive(Debug, Clone)]
pub struct ScrapedQuote {
    pub price_buy_raw: String,
    pub price_sell_raw: String,
    pub change: Option<ScrapedChange>,
}

#[async_trait]
pub trait QuotePageSource: Send + Sync {
    async fn fetch_quote(&self, stock: &Stock) -> Result<ScrapedQuote>;
}
