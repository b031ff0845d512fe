//! Batch scan pipeline: build a watch detail per watch and raise alerts
//!
//! Securities are processed concurrently and independently. A failure on one
//! security is captured in its outcome instead of aborting the run, so the
//! caller decides skip-vs-abort per item.

use crate::core::alerts::Alert;
use crate::core::error::{Result, TrackerError};
use crate::core::history::EodSource;
use crate::core::holding::{MonitorInstruction, PriceType};
use crate::core::money::percent_desc;
use crate::core::rates::CurrencyConverter;
use crate::core::scrape::QuotePageSource;
use crate::core::stock::Stock;
use crate::core::watch::{Watch, WatchDetail, WatchType};
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct ScanOutcome {
    pub watch_id: String,
    pub stock_id: String,
    pub detail: Result<WatchDetail>,
    pub alert: Option<Alert>,
}

/// Builds a fresh [`WatchDetail`] for every watch and evaluates threshold
/// alerts. One outcome per watch, in input order.
pub async fn scan_watches(
    watches: &[Watch],
    stocks: &HashMap<String, Stock>,
    eod_source: &dyn EodSource,
    page_source: &dyn QuotePageSource,
    converter: &CurrencyConverter,
) -> Vec<ScanOutcome> {
    let scan_futures = watches.iter().map(|watch| async move {
        let result = scan_one(watch, stocks, eod_source, page_source, converter).await;
        let (detail, alert) = match result {
            Ok((detail, alert)) => (Ok(detail), alert),
            Err(e) => {
                warn!("Scan failed for watch {}: {}", watch.watch_id, e);
                (Err(e), None)
            }
        };
        ScanOutcome {
            watch_id: watch.watch_id.clone(),
            stock_id: watch.stock_id.clone(),
            detail,
            alert,
        }
    });

    join_all(scan_futures).await
}

async fn scan_one(
    watch: &Watch,
    stocks: &HashMap<String, Stock>,
    eod_source: &dyn EodSource,
    page_source: &dyn QuotePageSource,
    converter: &CurrencyConverter,
) -> Result<(WatchDetail, Option<Alert>)> {
    let stock = stocks
        .get(&watch.stock_id)
        .cloned()
        .ok_or_else(|| TrackerError::UnknownStock {
            stock_id: watch.stock_id.clone(),
        })?;

    let detail = if stock.is_broker_sourced() {
        let quote = page_source.fetch_quote(&stock).await?;
        WatchDetail::from_scraped_quote(&quote, stock, watch.clone(), Utc::now().date_naive())?
    } else {
        let quotes = eod_source.fetch_eod(&stock.symbol).await?;
        WatchDetail::from_eod_quotes(quotes, stock, watch.clone(), converter).await?
    };

    let alert = evaluate_threshold(&detail, converter).await?;
    Ok((detail, alert))
}

/// A threshold watch fires when the absolute move from the reference price
/// reaches the watch's alert threshold.
async fn evaluate_threshold(
    detail: &WatchDetail,
    converter: &CurrencyConverter,
) -> Result<Option<Alert>> {
    if detail.watch.watch_type != WatchType::Threshold {
        return Ok(None);
    }

    let delta = detail.delta_reference_percent(converter).await?;
    if delta.abs() < detail.watch.alert_threshold {
        return Ok(None);
    }

    let message = format!(
        "{} moved {} from reference (threshold {})",
        detail.stock.display_name(),
        percent_desc(delta),
        detail.watch.alert_threshold_desc()
    );
    debug!("Raising alert: {message}");

    Ok(Some(Alert {
        instruction: MonitorInstruction {
            stock_id: detail.watch.stock_id.clone(),
            price_type: PriceType::Buy,
            marker_price: detail.watch.added_price_buy.amount,
            message: detail.watch.notes.clone(),
            holding: None,
        },
        stock: detail.stock.clone(),
        message,
    }))
}

/// Alerts raised across a scan, ready for the dispatch collaborator.
pub fn collect_alerts(outcomes: &[ScanOutcome]) -> Vec<Alert> {
    outcomes
        .iter()
        .filter_map(|outcome| outcome.alert.clone())
        .collect()
}
