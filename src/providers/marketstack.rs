//! MarketStack end-of-day price provider

use crate::core::error::{Result, TrackerError};
use crate::core::history::{EodQuote, EodSource};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Upstream dates look like `2020-10-09T00:00:00+0000`.
const TIME_FORMAT_MARKETSTACK: &str = "%Y-%m-%dT%H:%M:%S%z";

#[derive(Debug, Clone)]
pub struct EodRequest {
    pub symbols: Vec<String>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub limit: usize,
}

impl EodRequest {
    /// One-week window ending today, the shape the batch scan uses.
    pub fn last_week(symbol: &str, today: NaiveDate) -> Self {
        EodRequest {
            symbols: vec![symbol.to_string()],
            date_from: today.checked_sub_days(Days::new(7)).unwrap_or(today),
            date_to: today,
            limit: 100,
        }
    }

    pub fn url(&self, base_url: &str, access_key: &str) -> String {
        format!(
            "{}/v1/eod?symbols={}&access_key={}&date_from={}&date_to={}&limit={}",
            base_url,
            self.symbols.join(","),
            access_key,
            self.date_from.format("%Y-%m-%d"),
            self.date_to.format("%Y-%m-%d"),
            self.limit
        )
    }
}

pub struct MarketStackProvider {
    base_url: String,
    access_key: String,
}

impl MarketStackProvider {
    pub fn new(base_url: &str, access_key: &str) -> Self {
        MarketStackProvider {
            base_url: base_url.to_string(),
            access_key: access_key.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct MarketStackResponse {
    #[allow(dead_code)]
    pagination: Pagination,
    data: Vec<MarketStackEod>,
}

#[allow(dead_code)]
#[derive(Deserialize, Debug)]
struct Pagination {
    limit: usize,
    offset: usize,
    count: usize,
    total: usize,
}

#[derive(Deserialize, Debug)]
struct MarketStackEod {
    date: String,
    close: Decimal,
    exchange: String,
    symbol: String,
}

impl MarketStackEod {
    fn into_quote(self) -> Result<EodQuote> {
        let date = DateTime::parse_from_str(&self.date, TIME_FORMAT_MARKETSTACK)
            .map_err(|_| TrackerError::ParseDate(self.date.clone()))?
            .date_naive();
        Ok(EodQuote {
            symbol: self.symbol,
            date,
            close: self.close,
            exchange: self.exchange,
        })
    }
}

#[async_trait]
impl EodSource for MarketStackProvider {
    #[instrument(name = "MarketStackEodFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_eod(&self, symbol: &str) -> Result<Vec<EodQuote>> {
        let request = EodRequest::last_week(symbol, Utc::now().date_naive());
        let url = request.url(&self.base_url, &self.access_key);
        debug!("Requesting price history from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("stockwatch/1.0")
            .build()
            .map_err(|e| TrackerError::PriceFetch {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })?;

        let response =
            client
                .get(&url)
                .send()
                .await
                .map_err(|e| TrackerError::PriceFetch {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                })?;

        if !response.status().is_success() {
            return Err(TrackerError::PriceFetch {
                symbol: symbol.to_string(),
                reason: format!("HTTP error: {}", response.status()),
            });
        }

        let data = response
            .json::<MarketStackResponse>()
            .await
            .map_err(|e| TrackerError::Decode {
                what: format!("end-of-day response for {symbol}"),
                reason: e.to_string(),
            })?;

        data.data.into_iter().map(|eod| eod.into_quote()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn tsla_body() -> String {
        let closes = [434.0, 425.92, 425.3, 413.98, 425.68, 415.09];
        let data: Vec<String> = closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                format!(
                    r#"{{"date": "2020-10-{:02}T00:00:00+0000", "close": {close}, "exchange": "XNAS", "symbol": "TSLA"}}"#,
                    9 - i
                )
            })
            .collect();
        format!(
            r#"{{"pagination": {{"limit": 100, "offset": 0, "count": 6, "total": 6}}, "data": [{}]}}"#,
            data.join(",")
        )
    }

    async fn create_mock_server(body: &str, status: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/eod"))
            .and(query_param("symbols", "TSLA"))
            .and(query_param("access_key", "token123"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[test]
    fn test_request_url() {
        let request = EodRequest::last_week("TSLA", NaiveDate::from_ymd_opt(2020, 10, 9).unwrap());
        assert_eq!(
            request.url("http://api.example.com", "token123"),
            "http://api.example.com/v1/eod?symbols=TSLA&access_key=token123&date_from=2020-10-02&date_to=2020-10-09&limit=100"
        );
    }

    #[tokio::test]
    async fn test_successful_eod_fetch() {
        let mock_server = create_mock_server(&tsla_body(), 200).await;
        let provider = MarketStackProvider::new(&mock_server.uri(), "token123");

        let quotes = provider.fetch_eod("TSLA").await.unwrap();

        assert_eq!(quotes.len(), 6);
        assert_eq!(quotes[0].close, dec!(434.0));
        assert_eq!(quotes[0].exchange, "XNAS");
        assert_eq!(quotes[0].symbol, "TSLA");
        assert_eq!(
            quotes[0].date,
            NaiveDate::from_ymd_opt(2020, 10, 9).unwrap()
        );
        assert_eq!(quotes[5].close, dec!(415.09));
    }

    #[tokio::test]
    async fn test_http_error_is_price_fetch() {
        let mock_server = create_mock_server("", 500).await;
        let provider = MarketStackProvider::new(&mock_server.uri(), "token123");

        let err = provider.fetch_eod("TSLA").await.unwrap_err();
        assert!(matches!(
            err,
            TrackerError::PriceFetch { symbol, .. } if symbol == "TSLA"
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mock_server = create_mock_server(r#"{"pagination": {}}"#, 200).await;
        let provider = MarketStackProvider::new(&mock_server.uri(), "token123");

        let err = provider.fetch_eod("TSLA").await.unwrap_err();
        assert!(matches!(err, TrackerError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_bad_date_is_parse_error() {
        let body = r#"{"pagination": {"limit": 100, "offset": 0, "count": 1, "total": 1},
            "data": [{"date": "09/10/2020", "close": 434.0, "exchange": "XNAS", "symbol": "TSLA"}]}"#;
        let mock_server = create_mock_server(body, 200).await;
        let provider = MarketStackProvider::new(&mock_server.uri(), "token123");

        let err = provider.fetch_eod("TSLA").await.unwrap_err();
        assert!(matches!(err, TrackerError::ParseDate(_)));
    }
}
