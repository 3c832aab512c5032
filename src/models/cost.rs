use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Cost Explorer metric summed for every period.
pub const UNBLENDED_COST: &str = "UnblendedCost";

// ---------------------------------------------------------------------------
// Granularity — Row granularity requested from the billing source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Daily,
    Monthly,
}

// ---------------------------------------------------------------------------
// PeriodKind — Which section of the report a period feeds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Trailing N-day window ending today.
    Lookback,
    /// First of the current month up to today.
    MonthToDate,
    /// The whole previous calendar month.
    PreviousMonth,
}

// ---------------------------------------------------------------------------
// CostPeriod — A date range and the spend summed over it
// ---------------------------------------------------------------------------

/// `start` and `end` are the dates shown in the report. The billing query
/// always covers `start..query_end()` (end exclusive), which is `day_count`
/// days long.
///
/// For the lookback window and the month to date, `end` is the report date
/// itself and equals `query_end()`, so that day is not billed. For the
/// previous month, `end` is the last day of that month and is billed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostPeriod {
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub day_count: u32,
    pub total: f64,
}

impl CostPeriod {
    /// Exclusive end date passed to the billing source.
    pub fn query_end(&self) -> NaiveDate {
        self.start + Duration::days(i64::from(self.day_count))
    }

    pub fn granularity(&self) -> Granularity {
        match self.kind {
            PeriodKind::Lookback => Granularity::Daily,
            PeriodKind::MonthToDate | PeriodKind::PreviousMonth => Granularity::Monthly,
        }
    }

    /// True when there is nothing to bill yet (month-to-date on the 1st).
    pub fn is_empty(&self) -> bool {
        self.day_count == 0
    }

    pub fn query(&self) -> BillingQuery {
        BillingQuery {
            start: self.start,
            end: self.query_end(),
            granularity: self.granularity(),
        }
    }
}

// ---------------------------------------------------------------------------
// BillingQuery / CostRecord — Billing source request and response rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BillingQuery {
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    pub granularity: Granularity,
}

impl BillingQuery {
    pub fn metric(&self) -> &'static str {
        UNBLENDED_COST
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRecord {
    pub period_start: String,
    pub amount: f64,
    pub unit: Option<String>,
}

// ---------------------------------------------------------------------------
// CostReport — Everything the formatter needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    pub budget: f64,
    pub daily: CostPeriod,
    pub monthly_current: CostPeriod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_previous: Option<CostPeriod>,
}

impl CostReport {
    /// Percentage of the budget consumed by `period`, or `None` when the
    /// budget rounds up to zero.
    pub fn consumption(&self, period: &CostPeriod) -> Option<f64> {
        consumption_percentage(period.total, self.budget)
    }
}

/// `ceil(total) / ceil(budget) * 100`, rounded to one decimal place.
///
/// Both sides are rounded up so the figure never understates usage. Returns
/// `None` when `ceil(budget)` is zero.
pub fn consumption_percentage(total: f64, budget: f64) -> Option<f64> {
    let denominator = budget.ceil();
    if denominator <= 0.0 {
        return None;
    }
    let pct = total.ceil() / denominator * 100.0;
    Some((pct * 10.0).round() / 10.0)
}
