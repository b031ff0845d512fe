//! Shared backend library for a personal investment tracker.
//!
//! Fetches end-of-day prices from a market-data API and scraped broker
//! pages, normalizes them into a common [`core::money::Money`]
//! representation, converts currencies through a cached rate lookup and
//! derives price-change metrics for alerting and display.

pub mod core;
pub mod monitor;
pub mod providers;

pub use crate::core::config::AppConfig;
pub use crate::core::log::init_logging;
pub use crate::core::{
    Currency, CurrencyConverter, EodQuote, EodRecord, EodSource, HOME_CURRENCY, Money,
    PriceHistory, RateSource, Result, TrackerError, Watch, WatchDetail,
};
pub use crate::monitor::{ScanOutcome, collect_alerts, scan_watches};
