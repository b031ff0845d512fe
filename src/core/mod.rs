//! Core business logic: money, rates, history and watch read models

pub mod alerts;
pub mod config;
pub mod currency;
pub mod error;
pub mod history;
pub mod holding;
pub mod log;
pub mod money;
pub mod parse;
pub mod rates;
pub mod scrape;
pub mod secrets;
pub mod stock;
pub mod watch;

// Re-export main types for cleaner imports
pub use currency::{Currency, HOME_CURRENCY};
pub use error::{Result, TrackerError};
pub use history::{EodQuote, EodRecord, EodSource, PriceHistory};
pub use money::Money;
pub use rates::{CurrencyConverter, RateSource};
pub use watch::{Watch, WatchDetail};
