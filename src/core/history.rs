//! End-of-day price records and currency-normalized history

use crate::core::currency::Currency;
use crate::core::error::{Result, TrackerError};
use crate::core::money::Money;
use crate::core::rates::CurrencyConverter;
use crate::core::stock::{EXCHANGE_USA, Stock};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One upstream end-of-day observation, already decoded from the wire.
#[derive(Debug, Clone)]
pub struct EodQuote {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: Decimal,
    pub exchange: String,
}

#[async_trait]
pub trait EodSource: Send + Sync {
    async fn fetch_eod(&self, symbol: &str) -> Result<Vec<EodQuote>>;
}

/// A dated close price. `close_raw` keeps the upstream value in its native
/// currency so normalization stays re-derivable; `close_home` is the same
/// close expressed in the home currency once normalization has run.
#[derive(Debug, Clone)]
pub struct EodRecord {
    pub date: NaiveDate,
    pub close_raw: Decimal,
    pub close_home: Option<Money>,
    pub exchange: String,
}

impl EodRecord {
    pub fn close_subunits(&self) -> Option<Decimal> {
        self.close_home.map(|m| m.to_subunits())
    }
}

/// Ordered close-price history, newest first.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    records: Vec<EodRecord>,
}

impl PriceHistory {
    /// Builds a history from upstream records, sorting by date descending
    /// rather than trusting upstream response order.
    pub fn from_records(mut records: Vec<EodRecord>) -> Self {
        records.sort_by(|a, b| b.date.cmp(&a.date));
        PriceHistory { records }
    }

    pub fn from_quotes(quotes: &[EodQuote]) -> Self {
        let records = quotes
            .iter()
            .map(|q| EodRecord {
                date: q.date,
                close_raw: q.close,
                close_home: None,
                exchange: q.exchange.clone(),
            })
            .collect();
        Self::from_records(records)
    }

    pub fn latest(&self) -> Option<&EodRecord> {
        self.records.first()
    }

    pub fn previous(&self) -> Option<&EodRecord> {
        self.records.get(1)
    }

    pub fn records(&self) -> &[EodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Populates `close_home` on every record from its raw close. Closes from
    /// a US exchange are USD and go through the converter; every other
    /// exchange is treated as already denominated in the converter's home
    /// currency.
    ///
    /// The stock's exchange must be resolved before this runs.
    pub async fn normalize_closes(
        &mut self,
        stock: &Stock,
        converter: &CurrencyConverter,
    ) -> Result<()> {
        let exchange = stock
            .exchange
            .as_deref()
            .ok_or_else(|| TrackerError::UnresolvedExchange {
                symbol: stock.symbol.clone(),
            })?;

        let source_currency = if exchange == EXCHANGE_USA {
            Currency::Usd
        } else {
            converter.home()
        };

        for record in &mut self.records {
            let raw = Money::new(source_currency, record.close_raw);
            record.close_home = Some(converter.to_currency(&raw, converter.home()).await?);
        }

        Ok(())
    }
}

/// Resolves the exchange code from the first record of an upstream response.
pub fn derive_exchange(symbol: &str, quotes: &[EodQuote]) -> Result<String> {
    quotes
        .first()
        .map(|q| q.exchange.clone())
        .ok_or_else(|| TrackerError::NoRecords {
            symbol: symbol.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::RateSource;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct HalfRate;

    #[async_trait]
    impl RateSource for HalfRate {
        async fn lookup_rate(
            &self,
            _from: Currency,
            _to: Currency,
            _on: NaiveDate,
        ) -> Result<Decimal> {
            Ok(dec!(0.5))
        }
    }

    fn quote(date: (i32, u32, u32), close: Decimal, exchange: &str) -> EodQuote {
        EodQuote {
            symbol: "TSLA".to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            close,
            exchange: exchange.to_string(),
        }
    }

    #[test]
    fn test_unsorted_quotes_are_ordered_newest_first() {
        let quotes = vec![
            quote((2020, 10, 7), dec!(425.3), EXCHANGE_USA),
            quote((2020, 10, 9), dec!(434.0), EXCHANGE_USA),
            quote((2020, 10, 8), dec!(425.92), EXCHANGE_USA),
        ];

        let history = PriceHistory::from_quotes(&quotes);

        assert_eq!(history.latest().unwrap().close_raw, dec!(434.0));
        assert_eq!(history.previous().unwrap().close_raw, dec!(425.92));
        assert_eq!(history.records()[2].close_raw, dec!(425.3));
    }

    #[test]
    fn test_derive_exchange_from_first_record() {
        let quotes = vec![quote((2020, 10, 9), dec!(434.0), "XNAS")];
        assert_eq!(derive_exchange("TSLA", &quotes).unwrap(), "XNAS");

        let err = derive_exchange("TSLA", &[]).unwrap_err();
        assert!(matches!(err, TrackerError::NoRecords { symbol } if symbol == "TSLA"));
    }

    #[tokio::test]
    async fn test_normalize_converts_us_closes_to_pounds() {
        let converter = CurrencyConverter::new(Arc::new(HalfRate));
        let stock = Stock::with_exchange("s1", "Tesla, Inc.", "TSLA", EXCHANGE_USA);

        let mut history =
            PriceHistory::from_quotes(&[quote((2020, 10, 9), dec!(434.0), EXCHANGE_USA)]);
        history.normalize_closes(&stock, &converter).await.unwrap();

        let latest = history.latest().unwrap();
        assert_eq!(latest.close_raw, dec!(434.0));
        let home = latest.close_home.unwrap();
        assert_eq!(home.currency, Currency::Gbp);
        assert_eq!(home.amount, dec!(217.0));
        assert_eq!(latest.close_subunits(), Some(dec!(21700.0)));
    }

    #[tokio::test]
    async fn test_normalize_copies_domestic_closes_through() {
        let converter = CurrencyConverter::new(Arc::new(HalfRate));
        let stock = Stock::with_exchange("s2", "International Airlines Group", "IAG", "XLON");

        let mut history = PriceHistory::from_quotes(&[quote((2020, 10, 30), dec!(96.44), "XLON")]);
        history.normalize_closes(&stock, &converter).await.unwrap();

        let home = history.latest().unwrap().close_home.unwrap();
        assert_eq!(home, Money::new(Currency::Gbp, dec!(96.44)));
    }

    #[tokio::test]
    async fn test_normalize_honours_configured_home_currency() {
        let converter =
            CurrencyConverter::with_home_currency(Arc::new(HalfRate), Currency::Usd);
        let stock = Stock::with_exchange("s1", "Tesla, Inc.", "TSLA", EXCHANGE_USA);

        let mut history =
            PriceHistory::from_quotes(&[quote((2020, 10, 9), dec!(434.0), EXCHANGE_USA)]);
        history.normalize_closes(&stock, &converter).await.unwrap();

        // US closes are already home-denominated here, no rate applied.
        let home = history.latest().unwrap().close_home.unwrap();
        assert_eq!(home, Money::new(Currency::Usd, dec!(434.0)));
    }

    #[tokio::test]
    async fn test_normalize_requires_resolved_exchange() {
        let converter = CurrencyConverter::new(Arc::new(HalfRate));
        let stock = Stock::new("s3", "Tesla, Inc.", "TSLA");

        let mut history =
            PriceHistory::from_quotes(&[quote((2020, 10, 9), dec!(434.0), EXCHANGE_USA)]);
        let err = history
            .normalize_closes(&stock, &converter)
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::UnresolvedExchange { symbol } if symbol == "TSLA"));
    }
}
