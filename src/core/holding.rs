//! Holdings, lots and the monitor instructions that reference them

use crate::core::error::{Result, TrackerError};
use crate::core::money::Money;
use crate::core::stock::Stock;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Lot {
    pub stock_id: String,
    pub price_bought: Decimal,
    pub units: Decimal,
}

impl Lot {
    pub fn value_total_bought(&self) -> Decimal {
        self.price_bought * self.units
    }
}

#[derive(Debug, Clone, Default)]
pub struct Holding {
    pub stock_id: String,
    pub lots: Vec<Lot>,
}

impl Holding {
    pub fn units_total(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.units).sum()
    }

    pub fn value_total_bought(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.value_total_bought()).sum()
    }

    /// Weighted average purchase price across all lots.
    pub fn price_average_bought(&self) -> Result<Decimal> {
        let units = self.units_total();
        if units.is_zero() {
            return Err(TrackerError::EmptyHolding {
                stock_id: self.stock_id.clone(),
            });
        }
        Ok(self.value_total_bought() / units)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceType {
    Sell,
    Buy,
}

/// One standing instruction to watch a price level for a security.
#[derive(Debug, Clone)]
pub struct MonitorInstruction {
    pub stock_id: String,
    pub price_type: PriceType,
    pub marker_price: Decimal,
    pub message: String,
    pub holding: Option<Holding>,
}

impl MonitorInstruction {
    pub fn side_desc(&self) -> &'static str {
        match self.price_type {
            PriceType::Sell => "Sell",
            PriceType::Buy => "Buy",
        }
    }

    pub fn is_buy(&self) -> bool {
        self.price_type == PriceType::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.price_type == PriceType::Sell
    }
}

impl Stock {
    /// The quoted price on the side this instruction monitors.
    pub fn relevant_price(&self, instruction: &MonitorInstruction) -> Option<&Money> {
        match instruction.price_type {
            PriceType::Buy => self.price_buy.as_ref(),
            PriceType::Sell => self.price_sell.as_ref(),
        }
    }
}
