//! Cost retrieval: period computation, the billing source seam, and the
//! fetcher that turns periods into a [`CostReport`].

pub mod explorer;
pub mod period;
pub mod source;

pub use explorer::CostExplorerSource;
pub use period::ReportPeriods;
pub use source::CostSource;

use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::config::{validate_budget, ReportSettings};
use crate::error::Result;
use crate::models::{CostPeriod, CostReport};

// ---------------------------------------------------------------------------
// CostFetcher
// ---------------------------------------------------------------------------

/// Fills report periods with totals from a [`CostSource`].
pub struct CostFetcher<'a> {
    source: &'a dyn CostSource,
}

impl<'a> CostFetcher<'a> {
    /// Create a new `CostFetcher` bound to the given source.
    pub fn new(source: &'a dyn CostSource) -> Self {
        Self { source }
    }

    /// Compute the periods for `today` and fetch a total for each.
    ///
    /// The queries are independent and run concurrently; the first failure
    /// aborts the report.
    pub async fn fetch_report(&self, today: NaiveDate, settings: &ReportSettings) -> Result<CostReport> {
        let budget = validate_budget(settings.budget)?;
        let mut periods = ReportPeriods::compute(today, settings.cost_period_days)?;

        let previous = async {
            match &periods.monthly_previous {
                Some(p) => self.total(p).await.map(Some),
                None => Ok(None),
            }
        };
        let (daily, current, previous) = tokio::try_join!(
            self.total(&periods.daily),
            self.total(&periods.monthly_current),
            previous,
        )?;

        periods.daily.total = daily;
        periods.monthly_current.total = current;
        if let (Some(p), Some(total)) = (periods.monthly_previous.as_mut(), previous) {
            p.total = total;
        }

        info!(
            daily = periods.daily.total,
            monthly_current = periods.monthly_current.total,
            monthly_previous = ?periods.monthly_previous.as_ref().map(|p| p.total),
            "cost data retrieved"
        );

        Ok(periods.into_report(budget))
    }

    /// Sum every record the source returns for one period.
    pub async fn total(&self, period: &CostPeriod) -> Result<f64> {
        if period.is_empty() {
            debug!(kind = ?period.kind, start = %period.start, "empty period, skipping query");
            return Ok(0.0);
        }

        let query = period.query();
        let records = self.source.cost_records(&query).await.map_err(|e| {
            error!(
                kind = ?period.kind,
                start = %query.start,
                end = %query.end,
                error = %e,
                "cost data retrieval error"
            );
            e
        })?;

        debug!(kind = ?period.kind, rows = records.len(), "summing cost records");
        Ok(records.iter().map(|r| r.amount).sum())
    }
}
