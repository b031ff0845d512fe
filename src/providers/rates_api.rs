//! Exchange-rate provider over an exchangeratesapi-shaped history endpoint

use crate::core::currency::Currency;
use crate::core::error::{Result, TrackerError};
use crate::core::rates::RateSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

pub struct RatesApiProvider {
    base_url: String,
}

impl RatesApiProvider {
    pub fn new(base_url: &str) -> Self {
        RatesApiProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct RatesResponse {
    /// Date string to per-currency rate, e.g. `{"2020-10-09": {"GBP": 0.5}}`.
    rates: HashMap<String, HashMap<String, Decimal>>,
}

#[async_trait]
impl RateSource for RatesApiProvider {
    async fn lookup_rate(&self, from: Currency, to: Currency, on: NaiveDate) -> Result<Decimal> {
        let day = on.format("%Y-%m-%d").to_string();
        let url = format!(
            "{}/history?start_at={day}&end_at={day}&base={from}&symbols={to}",
            self.base_url
        );
        debug!("Requesting conversion rate from {}", url);

        let lookup_failed = |reason: String| TrackerError::RateLookup { from, to, reason };

        let client = reqwest::Client::builder()
            .user_agent("stockwatch/1.0")
            .build()
            .map_err(|e| lookup_failed(e.to_string()))?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| lookup_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(lookup_failed(format!("HTTP error: {}", response.status())));
        }

        let data = response
            .json::<RatesResponse>()
            .await
            .map_err(|e| lookup_failed(e.to_string()))?;

        data.rates
            .get(&day)
            .and_then(|day_rates| day_rates.get(to.code()))
            .copied()
            .ok_or_else(|| lookup_failed(format!("no rate published for {day}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(body: &str, status: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history"))
            .and(query_param("base", "USD"))
            .and(query_param("symbols", "GBP"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_rate_lookup() {
        let body = serde_json::json!({
            "rates": {"2020-10-09": {"GBP": 0.5}},
            "base": "USD"
        })
        .to_string();
        let mock_server = create_mock_server(&body, 200).await;
        let provider = RatesApiProvider::new(&mock_server.uri());

        let on = NaiveDate::from_ymd_opt(2020, 10, 9).unwrap();
        let rate = provider
            .lookup_rate(Currency::Usd, Currency::Gbp, on)
            .await
            .unwrap();
        assert_eq!(rate, dec!(0.5));
    }

    #[tokio::test]
    async fn test_missing_rate_in_payload() {
        let body = r#"{"rates": {}, "base": "USD"}"#;
        let mock_server = create_mock_server(body, 200).await;
        let provider = RatesApiProvider::new(&mock_server.uri());

        let on = NaiveDate::from_ymd_opt(2020, 10, 9).unwrap();
        let err = provider
            .lookup_rate(Currency::Usd, Currency::Gbp, on)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::RateLookup {
                from: Currency::Usd,
                to: Currency::Gbp,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_http_error_is_rate_lookup_error() {
        let mock_server = create_mock_server("", 500).await;
        let provider = RatesApiProvider::new(&mock_server.uri());

        let on = NaiveDate::from_ymd_opt(2020, 10, 9).unwrap();
        let err = provider
            .lookup_rate(Currency::Usd, Currency::Gbp, on)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::RateLookup { .. }));
    }
}
