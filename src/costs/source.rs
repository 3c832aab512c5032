//! Billing source abstraction.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BillingQuery, CostRecord};

/// Anything that can answer "what did this date range cost".
///
/// Implementations return every row the backend produced; summing is the
/// caller's job, so a source must not collapse or drop rows.
#[async_trait]
pub trait CostSource: Send + Sync {
    async fn cost_records(&self, query: &BillingQuery) -> Result<Vec<CostRecord>>;
}
