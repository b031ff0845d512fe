//! Exchange-rate lookup and the process-wide conversion cache
//!
//! Rates are fetched lazily from a [`RateSource`] collaborator on the first
//! conversion request for a currency pair. The reciprocal rate is inserted in
//! the same critical section, so converting A->B->A is exactly identity for
//! the lifetime of the cache and bidirectional conversions cost one lookup.

use crate::core::currency::{Currency, HOME_CURRENCY};
use crate::core::error::Result;
use crate::core::money::Money;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Looks up the conversion rate for a pair on a given day. Failure is
    /// fatal to the calling conversion; there is no retry or fallback.
    async fn lookup_rate(&self, from: Currency, to: Currency, on: NaiveDate) -> Result<Decimal>;
}

/// In-memory rate cache keyed by ordered currency pair. Entries never expire
/// within a process lifetime, which suits a batch job invoked once per run.
#[derive(Default)]
pub struct RateCache {
    inner: Mutex<HashMap<(Currency, Currency), Decimal>>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct CurrencyConverter {
    cache: RateCache,
    source: Arc<dyn RateSource>,
    home: Currency,
}

impl CurrencyConverter {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self::with_home_currency(source, HOME_CURRENCY)
    }

    /// Converter normalizing into a configured home currency instead of the
    /// default.
    pub fn with_home_currency(source: Arc<dyn RateSource>, home: Currency) -> Self {
        CurrencyConverter {
            cache: RateCache::new(),
            source,
            home,
        }
    }

    /// The currency all normalized prices are expressed in.
    pub fn home(&self) -> Currency {
        self.home
    }

    /// Returns the conversion factor from one currency to another, consulting
    /// the cache first. On a miss, one rate is fetched for the last working
    /// weekday and both directions are cached under a single lock, so
    /// concurrent converters cannot duplicate the lookup or tear the pair.
    pub async fn factor(&self, from: Currency, to: Currency) -> Result<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let mut cache = self.cache.inner.lock().await;
        if let Some(rate) = cache.get(&(from, to)) {
            debug!("Rate cache HIT for {from}->{to}");
            return Ok(*rate);
        }

        let on = last_working_weekday(Utc::now().date_naive());
        debug!("Rate cache MISS for {from}->{to}, looking up rate for {on}");
        let rate = self.source.lookup_rate(from, to, on).await?;

        cache.insert((from, to), rate);
        cache.insert((to, from), Decimal::ONE / rate);

        Ok(rate)
    }

    /// Re-tags money in the target currency, scaling by the pair's factor.
    pub async fn to_currency(&self, money: &Money, target: Currency) -> Result<Money> {
        let factor = self.factor(money.currency, target).await?;
        Ok(Money::new(target, money.amount * factor))
    }
}

/// Steps Saturdays and Sundays back to the preceding Friday. Upstream rate
/// APIs publish no weekend rates. Public holidays are not handled.
pub fn last_working_weekday(date: NaiveDate) -> NaiveDate {
    let mut date = date;
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date = date.pred_opt().unwrap_or(date);
    }
    date
}
