//! Parser for heterogeneous price strings
//!
//! Upstream prices arrive either as scraped page fragments (`"1,234.50p"`,
//! `"£1.50"`, `"$12.34"`) or as stringified JSON decimals with no symbol at
//! all. The parser maps every shape onto a [`Money`] in major units.

use crate::core::currency::Currency;
use crate::core::error::Result;
use crate::core::money::Money;

/// Converts a raw price string into [`Money`].
///
/// An empty string is treated as zero GBP; any other input that fails to
/// parse after symbol stripping is an error.
pub fn parse_price(raw: &str) -> Result<Money> {
    let price = raw.replace(',', "");

    if price.is_empty() {
        return Ok(Money::zero(Currency::Gbp));
    }

    if let Some(pence) = price.strip_suffix('p') {
        return Money::from_pence(pence);
    }

    if let Some(pounds) = price.strip_prefix('£') {
        return Money::from_pounds(pounds);
    }

    if let Some(dollars) = price.strip_prefix('$') {
        let amount = Money::from_pounds(dollars)?.amount;
        return Ok(Money::new(Currency::Usd, amount));
    }

    Money::from_pounds(&price)
}
