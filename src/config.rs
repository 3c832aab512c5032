//! Invocation configuration: constants, injected defaults, and the single
//! parse-and-validate step that turns a scheduler event into typed settings.
//!
//! Every field of the event `detail` object is checked here. Anything that
//! does not fit the expected shape is rejected with
//! [`NotifierError::Configuration`] rather than silently coerced.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{NotifierError, Result};

pub const DEFAULT_USERNAME: &str = "AWS Notifier";
pub const DEFAULT_AVATAR_URL: &str =
    "https://shared-handson.github.io/icons-factory/aws/Cloud-logo.png";

/// Cost Explorer only serves requests from this region.
pub const COST_EXPLORER_REGION: &str = "us-east-1";

/// `https://discord.com/api/webhooks/<id>/<token>`, optionally followed by a
/// query such as `?thread_id=...`.
pub const WEBHOOK_URL_PATTERN: &str = r"^https://discord\.com/api/webhooks/\d+/[\w-]+(\?\S*)?$";

static WEBHOOK_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(WEBHOOK_URL_PATTERN).expect("webhook URL pattern is valid"));

pub const DEFAULT_BUDGET: f64 = 1.0;
pub const MIN_BUDGET: f64 = 0.0;
pub const MAX_BUDGET: f64 = 9999.0;

pub const DEFAULT_COST_PERIOD_DAYS: u32 = 1;
pub const MIN_COST_PERIOD_DAYS: u32 = 1;
pub const MAX_COST_PERIOD_DAYS: u32 = 30;

// ---------------------------------------------------------------------------
// NotifierDefaults
// ---------------------------------------------------------------------------

/// Display defaults applied when the event does not override them.
///
/// Passed into [`crate::CostNotifier`] at construction; the footer of every
/// report is labelled with `username` regardless of the per-event override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierDefaults {
    pub username: String,
    pub avatar_url: String,
}

impl Default for NotifierDefaults {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// NotifierConfig
// ---------------------------------------------------------------------------

/// Where and as whom the report is posted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifierConfig {
    #[serde(serialize_with = "serialize_redacted_endpoint")]
    pub endpoint: String,
    pub display_name: String,
    pub avatar_url: String,
}

impl NotifierConfig {
    fn from_detail(detail: &EventDetail, defaults: &NotifierDefaults) -> Result<Self> {
        let endpoint = match detail.webhook_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                return Err(NotifierError::config(
                    "Webhook URL is not defined (event key: detail.webhookUrl)",
                ))
            }
        };
        validate_webhook_url(&endpoint)?;

        let display_name = match detail.webhook_username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => defaults.username.clone(),
        };

        let avatar_url = match detail.webhook_avatar_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                validate_avatar_url(url)?;
                url.to_string()
            }
            _ => defaults.avatar_url.clone(),
        };

        Ok(Self {
            endpoint,
            display_name,
            avatar_url,
        })
    }
}

/// Echo the endpoint with its token replaced, keeping the webhook id.
fn serialize_redacted_endpoint<S: Serializer>(endpoint: &str, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&redact_webhook_url(endpoint))
}

/// Replace the token segment of a webhook URL with `***`. A query string is
/// kept as is.
pub fn redact_webhook_url(endpoint: &str) -> String {
    let (path, query) = match endpoint.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (endpoint, None),
    };
    let redacted = match path.rsplit_once('/') {
        Some((prefix, token)) if !token.is_empty() => format!("{prefix}/***"),
        _ => path.to_string(),
    };
    match query {
        Some(query) => format!("{redacted}?{query}"),
        None => redacted,
    }
}

/// Check a webhook URL against [`WEBHOOK_URL_PATTERN`].
pub fn validate_webhook_url(url: &str) -> Result<()> {
    if !WEBHOOK_URL_RE.is_match(url) {
        return Err(NotifierError::config(format!(
            "Invalid value for webhookUrl: {}",
            redact_webhook_url(url)
        )));
    }
    Ok(())
}

fn validate_avatar_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| NotifierError::config(format!("Invalid value for webhookAvatarUrl: {url} ({e})")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(NotifierError::config(format!(
            "Invalid value for webhookAvatarUrl: {url} (unsupported scheme {scheme})"
        ))),
    }
}

// ---------------------------------------------------------------------------
// ReportSettings
// ---------------------------------------------------------------------------

/// Budget and lookback window for one report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSettings {
    pub budget: f64,
    pub cost_period_days: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            cost_period_days: DEFAULT_COST_PERIOD_DAYS,
        }
    }
}

impl ReportSettings {
    fn from_detail(detail: &EventDetail) -> Result<Self> {
        let budget = match &detail.budget {
            Some(value) => validate_budget(number_field("budget", value)?)?,
            None => DEFAULT_BUDGET,
        };

        let period = match (&detail.cost_period_days, &detail.legacy_cost_period_days) {
            (Some(_), Some(_)) => {
                return Err(NotifierError::config(
                    "Both costPeriodDays and cost_period_days are set; use costPeriodDays only",
                ))
            }
            (Some(value), None) => Some(("costPeriodDays", value)),
            (None, Some(value)) => {
                warn!("detail.cost_period_days is deprecated; use detail.costPeriodDays");
                Some(("cost_period_days", value))
            }
            (None, None) => None,
        };

        let cost_period_days = match period {
            Some((field, value)) => validate_cost_period_days_named(field, integer_field(field, value)?)?,
            None => DEFAULT_COST_PERIOD_DAYS,
        };

        Ok(Self {
            budget,
            cost_period_days,
        })
    }
}

/// Check that a budget lies within [`MIN_BUDGET`]..=[`MAX_BUDGET`].
pub fn validate_budget(budget: f64) -> Result<f64> {
    if !(MIN_BUDGET..=MAX_BUDGET).contains(&budget) {
        return Err(NotifierError::config(format!(
            "budget must be in the range of {MIN_BUDGET}-{MAX_BUDGET}: {budget}"
        )));
    }
    Ok(budget)
}

/// Check that a lookback window lies within
/// [`MIN_COST_PERIOD_DAYS`]..=[`MAX_COST_PERIOD_DAYS`].
pub fn validate_cost_period_days(days: i64) -> Result<u32> {
    validate_cost_period_days_named("costPeriodDays", days)
}

fn validate_cost_period_days_named(field: &str, days: i64) -> Result<u32> {
    let min = i64::from(MIN_COST_PERIOD_DAYS);
    let max = i64::from(MAX_COST_PERIOD_DAYS);
    if !(min..=max).contains(&days) {
        return Err(NotifierError::config(format!(
            "{field} must be in the range of {min}-{max}: {days}"
        )));
    }
    // In range, so the conversion cannot truncate.
    Ok(days as u32)
}

fn number_field(field: &str, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(NotifierError::config(format!("Invalid value for {field}: {value}"))),
    }
}

fn integer_field(field: &str, value: &Value) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| NotifierError::config(format!("Invalid value for {field}: {value}")))
}

// ---------------------------------------------------------------------------
// Event parsing
// ---------------------------------------------------------------------------

/// The `detail` object of a scheduler event. Numeric fields stay raw JSON so
/// that error messages can name the offending value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDetail {
    webhook_url: Option<String>,
    webhook_username: Option<String>,
    webhook_avatar_url: Option<String>,
    budget: Option<Value>,
    cost_period_days: Option<Value>,
    #[serde(rename = "cost_period_days")]
    legacy_cost_period_days: Option<Value>,
}

/// Everything one invocation needs, parsed from the event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationConfig {
    pub notifier: NotifierConfig,
    pub report: ReportSettings,
}

impl InvocationConfig {
    /// Parse and validate an event payload.
    ///
    /// A missing or non-object `detail` is treated as empty, which then fails
    /// on the required `webhookUrl`.
    pub fn from_event(event: &Value, defaults: &NotifierDefaults) -> Result<Self> {
        let detail = match event.get("detail") {
            Some(d @ Value::Object(_)) => serde_json::from_value::<EventDetail>(d.clone())
                .map_err(|e| NotifierError::config(format!("Invalid event detail: {e}")))?,
            Some(other) => {
                debug!(detail = %other, "event detail is not an object, ignoring");
                EventDetail::default()
            }
            None => EventDetail::default(),
        };

        let notifier = NotifierConfig::from_detail(&detail, defaults)?;
        let report = ReportSettings::from_detail(&detail)?;

        info!(
            webhook_username = %notifier.display_name,
            webhook_avatar_url = %notifier.avatar_url,
            budget = report.budget,
            cost_period_days = report.cost_period_days,
            "retrieved config values"
        );

        Ok(Self { notifier, report })
    }
}
