//! Tracked security identity and metadata

use crate::core::money::Money;
use chrono::{Days, NaiveDate};

pub const EXCHANGE_LONDON: &str = "XLON";
pub const EXCHANGE_USA: &str = "XNAS";

#[derive(Debug, Clone, Default)]
pub struct Stock {
    pub stock_id: String,
    pub description: String,
    /// Display name on the broker site; when set, prices come from the
    /// scraped broker page instead of the market-data API.
    pub broker_name: String,
    /// Either a full replacement URL or a path suffix for the broker page.
    pub broker_url_override: String,
    pub symbol: String,
    /// Back-filled from the first upstream response when unset.
    pub exchange: Option<String>,
    pub price_buy: Option<Money>,
    pub price_sell: Option<Money>,
}

impl Stock {
    pub fn new(stock_id: &str, description: &str, symbol: &str) -> Self {
        Stock {
            stock_id: stock_id.to_string(),
            description: description.to_string(),
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    pub fn with_exchange(stock_id: &str, description: &str, symbol: &str, exchange: &str) -> Self {
        Stock {
            exchange: Some(exchange.to_string()),
            ..Self::new(stock_id, description, symbol)
        }
    }

    pub fn display_name(&self) -> &str {
        if self.broker_name.is_empty() {
            &self.description
        } else {
            &self.broker_name
        }
    }

    pub fn is_broker_sourced(&self) -> bool {
        !self.broker_name.is_empty()
    }

    /// Broker fund page, derived from the broker name unless overridden.
    pub fn broker_page_url(&self, base_url: &str) -> String {
        if self.broker_url_override.starts_with("http") {
            return self.broker_url_override.clone();
        }

        let suffix = if self.broker_url_override.is_empty() {
            broker_slug(&self.broker_name)
        } else {
            self.broker_url_override.clone()
        };

        format!("{base_url}/{suffix}")
    }

    /// Market-data end-of-day URL with a one-week date window.
    pub fn market_data_url(&self, base_url: &str, access_key: &str, today: NaiveDate) -> String {
        let week_ago = today.checked_sub_days(Days::new(7)).unwrap_or(today);
        format!(
            "{}/v1/eod?symbols={}&access_key={}&date_from={}&date_to={}",
            base_url,
            self.symbol,
            access_key,
            week_ago.format("%Y-%m-%d"),
            today.format("%Y-%m-%d")
        )
    }

    /// Human-facing quote page for the symbol. London-suffixed symbols map to
    /// the LON listing; everything else is assumed NASDAQ.
    pub fn quote_page_url(&self) -> String {
        let mut tokens = self.symbol.split('.');
        let ticker = tokens.next().unwrap_or(&self.symbol);
        let listing = match tokens.next() {
            Some(EXCHANGE_LONDON) => "LON",
            _ => "NASDAQ",
        };
        format!("https://www.google.com/finance/quote/{ticker}:{listing}")
    }
}

/// Lowercased dashed slug prefixed with its leading letter, the path shape
/// the broker's fund search uses.
fn broker_slug(name: &str) -> String {
    let mut slug = name.replace(' ', "-");
    while slug.contains("---") {
        slug = slug.replace("---", "-");
    }
    slug = slug.replace('%', "").replace('&', "and").to_lowercase();

    match slug.chars().next() {
        Some(initial) => format!("{initial}/{slug}"),
        None => slug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_broker_name() {
        let mut stock = Stock::new("s1", "Legal & General UK Index", "LGEN");
        assert_eq!(stock.display_name(), "Legal & General UK Index");
        assert!(!stock.is_broker_sourced());

        stock.broker_name = "L&G UK Index Class C".to_string();
        assert_eq!(stock.display_name(), "L&G UK Index Class C");
        assert!(stock.is_broker_sourced());
    }

    #[test]
    fn test_broker_slug_shape() {
        let stock = Stock {
            broker_name: "Legal & General US Index".to_string(),
            ..Default::default()
        };
        assert_eq!(
            stock.broker_page_url("https://broker.example/funds"),
            "https://broker.example/funds/l/legal-and-general-us-index"
        );
    }

    #[test]
    fn test_broker_url_override_wins() {
        let stock = Stock {
            broker_name: "Some Fund".to_string(),
            broker_url_override: "https://broker.example/special/fund-page".to_string(),
            ..Default::default()
        };
        assert_eq!(
            stock.broker_page_url("https://broker.example/funds"),
            "https://broker.example/special/fund-page"
        );

        let stock = Stock {
            broker_name: "Some Fund".to_string(),
            broker_url_override: "s/some-fund-override".to_string(),
            ..Default::default()
        };
        assert_eq!(
            stock.broker_page_url("https://broker.example/funds"),
            "https://broker.example/funds/s/some-fund-override"
        );
    }

    #[test]
    fn test_market_data_url_window() {
        let stock = Stock::new("s1", "Tesla, Inc.", "TSLA");
        let today = NaiveDate::from_ymd_opt(2020, 10, 9).unwrap();
        assert_eq!(
            stock.market_data_url("http://api.example.com", "token123", today),
            "http://api.example.com/v1/eod?symbols=TSLA&access_key=token123&date_from=2020-10-02&date_to=2020-10-09"
        );
    }

    #[test]
    fn test_quote_page_url_listing() {
        let us = Stock::new("s1", "Tesla, Inc.", "TSLA");
        assert_eq!(
            us.quote_page_url(),
            "https://www.google.com/finance/quote/TSLA:NASDAQ"
        );

        let uk = Stock::new("s2", "International Airlines Group", "IAG.XLON");
        assert_eq!(
            uk.quote_page_url(),
            "https://www.google.com/finance/quote/IAG:LON"
        );
    }
}
