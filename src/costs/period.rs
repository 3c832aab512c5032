//! Date-range arithmetic for the three report sections.
//!
//! Everything here is a pure function of `today` and the lookback length, so
//! callers can pin "today" in tests and get identical periods back.

use chrono::{Datelike, Days, NaiveDate};

use crate::config::validate_cost_period_days;
use crate::error::{NotifierError, Result};
use crate::models::{CostPeriod, CostReport, PeriodKind};

/// The up-to-three date ranges a report is built from. Totals are zero until
/// the fetcher fills them in.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPeriods {
    pub daily: CostPeriod,
    pub monthly_current: CostPeriod,
    pub monthly_previous: Option<CostPeriod>,
}

impl ReportPeriods {
    /// Compute the lookback window, the month to date, and the previous month
    /// when the lookback window starts before the current month.
    ///
    /// A lookback reaching back more than one month still only adds the
    /// previous month.
    pub fn compute(today: NaiveDate, lookback_days: u32) -> Result<Self> {
        let lookback_days = validate_cost_period_days(i64::from(lookback_days))?;

        let daily_start = today
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .ok_or_else(|| {
                NotifierError::InvalidArgument(format!(
                    "{lookback_days} days before {today} is out of range"
                ))
            })?;
        let daily = CostPeriod {
            kind: PeriodKind::Lookback,
            start: daily_start,
            end: today,
            day_count: lookback_days,
            total: 0.0,
        };

        let month_start = first_of_month(today);
        let monthly_current = CostPeriod {
            kind: PeriodKind::MonthToDate,
            start: month_start,
            end: today,
            day_count: today.day0(),
            total: 0.0,
        };

        let monthly_previous = if daily.start < month_start {
            Some(previous_month(month_start)?)
        } else {
            None
        };

        Ok(Self {
            daily,
            monthly_current,
            monthly_previous,
        })
    }

    /// Periods in report order.
    pub fn iter(&self) -> impl Iterator<Item = &CostPeriod> {
        [&self.daily, &self.monthly_current]
            .into_iter()
            .chain(self.monthly_previous.as_ref())
    }

    pub fn into_report(self, budget: f64) -> CostReport {
        CostReport {
            budget,
            daily: self.daily,
            monthly_current: self.monthly_current,
            monthly_previous: self.monthly_previous,
        }
    }
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // day0() is at most 30, so this never leaves the month.
    date - Days::new(u64::from(date.day0()))
}

/// The full calendar month before the one starting at `month_start`.
fn previous_month(month_start: NaiveDate) -> Result<CostPeriod> {
    let last = month_start.pred_opt().ok_or_else(|| {
        NotifierError::InvalidArgument(format!("no month precedes {month_start}"))
    })?;
    Ok(CostPeriod {
        kind: PeriodKind::PreviousMonth,
        start: first_of_month(last),
        end: last,
        day_count: last.day(),
        total: 0.0,
    })
}
