//! Turns a [`CostReport`] into the Discord embed that gets posted.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::NotifierDefaults;
use crate::models::{CostPeriod, CostReport, Embed};

/// AWS orange.
pub const EMBED_COLOR: u32 = 0xFF9900;

pub const REPORT_TITLE: &str = "AWS Cost Report 💰";
pub const FIELD_DAILY_TOTAL: &str = "💸 Total";
pub const FIELD_DAILY_DAYS: &str = "📅 Period";
pub const FIELD_MONTH_CURRENT: &str = "🗓️ This month";
pub const FIELD_MONTH_PREVIOUS: &str = "🗓️ Last month";

/// Shown in place of a percentage when the budget rounds up to zero.
pub const NOT_AVAILABLE: &str = "N/A";

/// Build the report embed. The footer is labelled with the default notifier
/// name, not the per-event display name.
pub fn build_embed(report: &CostReport, defaults: &NotifierDefaults) -> Embed {
    let daily = &report.daily;
    let description = format!(
        "AWS charges for {} from **{}** to **{}** 📊",
        period_label(daily.day_count),
        format_date(daily.start),
        format_date(daily.end),
    );

    let mut embed = Embed::new(REPORT_TITLE, description, EMBED_COLOR)
        .field(
            FIELD_DAILY_TOTAL,
            format!(
                "{} ({} of budget)",
                format_usd(daily.total),
                format_percentage(report.consumption(daily))
            ),
            true,
        )
        .field(FIELD_DAILY_DAYS, format_day_count(daily.day_count), true)
        .field(
            FIELD_MONTH_CURRENT,
            month_field_value(report, &report.monthly_current),
            false,
        );

    if let Some(previous) = &report.monthly_previous {
        embed = embed.field(FIELD_MONTH_PREVIOUS, month_field_value(report, previous), false);
    }

    let embed = embed.footer(
        format!("{} | Dates are UTC (YYYY-MM-DD)", defaults.username),
        Some(defaults.avatar_url.clone()),
    );

    debug!(fields = embed.fields.len(), "cost embed created");
    embed
}

fn month_field_value(report: &CostReport, period: &CostPeriod) -> String {
    format!(
        "{} / {} ({})\n{} to {}",
        format_usd(period.total),
        format_usd(report.budget),
        format_percentage(report.consumption(period)),
        format_date(period.start),
        format_date(period.end),
    )
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// "yesterday" for a one-day window, "the past N days" otherwise.
pub fn period_label(days: u32) -> String {
    if days == 1 {
        "yesterday".to_string()
    } else {
        format!("the past {days} days")
    }
}

pub fn format_day_count(days: u32) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

pub fn format_usd(amount: f64) -> String {
    format!("${amount:.2} USD")
}

pub fn format_percentage(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:.1}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}
