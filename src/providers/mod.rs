pub mod marketstack;
pub mod rates_api;

pub use marketstack::MarketStackProvider;
pub use rates_api::RatesApiProvider;
