//! Watches and the per-fetch-cycle read model with its derived metrics
//!
//! `WatchDetail` is assembled fresh on every price-fetch cycle from a stock,
//! the user's watch and the fetched history. Everything it exposes is a pure
//! derivation over that data; insufficient history degrades to placeholder
//! text so partial data never blocks reporting on other securities.

use crate::core::currency::{Currency, HOME_CURRENCY};
use crate::core::error::{Result, TrackerError};
use crate::core::history::{EodQuote, EodRecord, PriceHistory, derive_exchange};
use crate::core::money::{Money, percent_change, percent_desc};
use crate::core::parse::parse_price;
use crate::core::rates::CurrencyConverter;
use crate::core::scrape::ScrapedQuote;
use crate::core::stock::Stock;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::warn;

const TIME_FORMAT_MYSQL: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT_ISO: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchType {
    Threshold,
    CrashAnalysis,
}

/// A user's tracking record for one security.
#[derive(Debug, Clone)]
pub struct Watch {
    pub watch_id: String,
    pub stock_id: String,
    /// Timestamp of the reference price, as stored upstream.
    pub dt_reference: String,
    pub added_price_buy: Money,
    pub added_price_sell: Money,
    /// Percent move from the reference price that should raise an alert.
    pub alert_threshold: Decimal,
    pub notes: String,
    pub dt_added: String,
    pub watch_type: WatchType,
    pub dt_stop: String,
}

impl Watch {
    pub fn alert_threshold_desc(&self) -> String {
        percent_desc(self.alert_threshold)
    }

    pub fn price_buy_desc(&self) -> String {
        self.added_price_buy.describe()
    }
}

/// Read model combining a stock, its watch and the fetched price history.
#[derive(Debug, Clone)]
pub struct WatchDetail {
    pub stock: Stock,
    pub watch: Watch,
    pub history: PriceHistory,
    /// Currency the history was normalized into at assembly time.
    pub home_currency: Currency,
    /// Set only when the upstream page reported a change percent directly.
    pub change_percent: Option<Decimal>,
}

impl WatchDetail {
    /// Assembles a detail from a market-data end-of-day response. Resolves
    /// the stock's exchange from the response when unset, then normalizes
    /// every close into the home currency.
    pub async fn from_eod_quotes(
        quotes: Vec<EodQuote>,
        mut stock: Stock,
        watch: Watch,
        converter: &CurrencyConverter,
    ) -> Result<Self> {
        // Exchange must be known before any currency conversion happens.
        if stock.exchange.is_none() {
            stock.exchange = Some(derive_exchange(&stock.symbol, &quotes)?);
        }

        let mut history = PriceHistory::from_quotes(&quotes);
        history.normalize_closes(&stock, converter).await?;

        Ok(WatchDetail {
            stock,
            watch,
            history,
            home_currency: converter.home(),
            change_percent: None,
        })
    }

    /// Assembles a detail from one scraped broker quote: a single record
    /// dated today with the sell price as its close, plus the change percent
    /// the page reported.
    pub fn from_scraped_quote(
        quote: &ScrapedQuote,
        mut stock: Stock,
        watch: Watch,
        today: NaiveDate,
    ) -> Result<Self> {
        let price_buy = parse_price(&quote.price_buy_raw)?;
        let price_sell = parse_price(&quote.price_sell_raw)?;
        stock.price_buy = Some(price_buy);
        stock.price_sell = Some(price_sell);

        let history = PriceHistory::from_records(vec![EodRecord {
            date: today,
            close_raw: price_sell.amount,
            close_home: Some(price_sell),
            exchange: String::new(),
        }]);

        Ok(WatchDetail {
            stock,
            watch,
            history,
            // Broker pages quote in the tracker's home currency.
            home_currency: HOME_CURRENCY,
            change_percent: quote.change.as_ref().map(|c| c.signed()),
        })
    }

    /// Most recent close in the home currency, `None` when there is no
    /// (normalized) history. A populated close in any other currency breaks
    /// the normalization invariant and is surfaced as a mismatch.
    pub fn price_last_close(&self) -> Result<Option<Money>> {
        let Some(close) = self.history.latest().and_then(|r| r.close_home) else {
            return Ok(None);
        };

        if close.currency != self.home_currency {
            return Err(TrackerError::CurrencyMismatch {
                op: "price_last_close",
                left: self.home_currency,
                right: close.currency,
            });
        }

        Ok(Some(close))
    }

    pub fn price_last_close_desc(&self) -> Result<String> {
        Ok(match self.price_last_close()? {
            Some(close) => close.describe(),
            None => "No price history".to_string(),
        })
    }

    pub fn price_last_close_subunits(&self) -> Result<Option<Decimal>> {
        Ok(self.price_last_close()?.map(|m| m.to_subunits()))
    }

    pub fn price_previous_close_desc(&self) -> String {
        match self.history.previous().and_then(|r| r.close_home) {
            Some(close) => close.describe(),
            None => "No previous".to_string(),
        }
    }

    /// Day-on-day change percent: the upstream-reported value when present,
    /// otherwise computed from the two newest closes.
    pub fn change_percent_desc(&self) -> Result<String> {
        if let Some(reported) = self.change_percent {
            return Ok(percent_desc(reported));
        }

        let (Some(last), Some(previous)) = (
            self.history.latest().and_then(|r| r.close_home),
            self.history.previous().and_then(|r| r.close_home),
        ) else {
            warn!(
                stock = %self.stock.display_name(),
                "Not enough history to compute change percent"
            );
            return Ok(String::new());
        };

        let change = percent_change(previous.amount, last.amount)?;
        Ok(percent_desc(change))
    }

    /// Percent move of the last close relative to the watch's reference buy
    /// price, both in the home currency.
    pub async fn delta_reference_percent(&self, converter: &CurrencyConverter) -> Result<Decimal> {
        let reference = converter
            .to_currency(&self.watch.added_price_buy, self.home_currency)
            .await?;

        let last_close =
            self.price_last_close()?
                .ok_or_else(|| TrackerError::NoRecords {
                    symbol: self.stock.symbol.clone(),
                })?;

        if reference.currency != last_close.currency {
            return Err(TrackerError::CurrencyMismatch {
                op: "delta_reference_percent",
                left: reference.currency,
                right: last_close.currency,
            });
        }

        percent_change(reference.amount, last_close.amount)
    }

    pub async fn delta_reference_percent_desc(
        &self,
        converter: &CurrencyConverter,
    ) -> Result<String> {
        Ok(percent_desc(self.delta_reference_percent(converter).await?))
    }

    /// Reference timestamp rendered RFC822-style, e.g. `09 Oct 20 00:00 UTC`.
    /// Upstream stores either MySQL or ISO8601 shaped timestamps.
    pub fn dt_reference_desc(&self) -> Result<String> {
        let raw = &self.watch.dt_reference;
        let parsed = NaiveDateTime::parse_from_str(raw, TIME_FORMAT_MYSQL)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, TIME_FORMAT_ISO))
            .map_err(|_| TrackerError::ParseDate(raw.clone()))?;

        Ok(parsed.format("%d %b %y %H:%M UTC").to_string())
    }
}
