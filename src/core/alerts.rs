//! Alert triples handed to the downstream dispatch collaborator

use crate::core::error::Result;
use crate::core::holding::MonitorInstruction;
use crate::core::stock::Stock;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct Alert {
    pub instruction: MonitorInstruction,
    pub stock: Stock,
    pub message: String,
}

/// Delivery transport for raised alerts; implementations live outside this
/// crate.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn dispatch(&self, alerts: &[Alert]) -> Result<()>;
}
