//! AWS cost notifier.
//!
//! Queries AWS Cost Explorer for the recent and month-to-date spend, formats
//! a budget summary, and posts it to a Discord webhook. One invocation is
//! driven by a scheduler event (EventBridge shape) whose `detail` object
//! carries the webhook and report settings.
//!
//! # Quick start
//!
//! ```no_run
//! use aws_cost_notifier::CostNotifier;
//!
//! # async fn example() -> aws_cost_notifier::Result<()> {
//! let notifier = CostNotifier::builder().build().await?;
//!
//! let event = serde_json::json!({
//!     "detail": {
//!         "webhookUrl": "https://discord.com/api/webhooks/123456/token",
//!         "budget": 120,
//!         "costPeriodDays": 7
//!     }
//! });
//! let result = notifier.handle(&event).await;
//! assert!(result.is_success());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod costs;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod webhook;

pub use config::{InvocationConfig, NotifierConfig, NotifierDefaults, ReportSettings};
pub use costs::{CostExplorerSource, CostFetcher, CostSource, ReportPeriods};
pub use error::{NotifierError, Result};
pub use models::{CostPeriod, CostReport, InvocationResult};
pub use webhook::{DryRunSink, MessageSink, WebhookClient};

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{error, info};

use models::WebhookMessage;

// ---------------------------------------------------------------------------
// CostNotifierBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CostNotifier`].
///
/// Use [`CostNotifier::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CostNotifierBuilder::build).
pub struct CostNotifierBuilder {
    defaults: NotifierDefaults,
    timeout: Duration,
    today: Option<NaiveDate>,
    cost_source: Option<Box<dyn CostSource>>,
    sink: Option<Box<dyn MessageSink>>,
    dry_run: bool,
}

impl Default for CostNotifierBuilder {
    fn default() -> Self {
        Self {
            defaults: NotifierDefaults::default(),
            timeout: Duration::from_secs(30),
            today: None,
            cost_source: None,
            sink: None,
            dry_run: false,
        }
    }
}

impl CostNotifierBuilder {
    /// Set the display name and avatar used when the event omits them.
    pub fn defaults(mut self, defaults: NotifierDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the HTTP timeout for webhook delivery.
    ///
    /// Defaults to 30 seconds. Ignored when a custom sink is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pin "today" instead of reading the UTC clock on every invocation.
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Use a custom billing source instead of Cost Explorer.
    pub fn cost_source(mut self, source: impl CostSource + 'static) -> Self {
        self.cost_source = Some(Box::new(source));
        self
    }

    /// Use a custom message sink instead of the webhook client.
    pub fn sink(mut self, sink: impl MessageSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Print messages instead of posting them. Ignored when a custom sink is
    /// supplied.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build the notifier.
    ///
    /// Without a custom cost source this loads AWS credentials from the
    /// environment; no request is sent until an event is handled.
    pub async fn build(self) -> Result<CostNotifier> {
        let source: Box<dyn CostSource> = match self.cost_source {
            Some(source) => source,
            None => Box::new(CostExplorerSource::from_env().await),
        };
        let sink: Box<dyn MessageSink> = match self.sink {
            Some(sink) => sink,
            None if self.dry_run => Box::new(DryRunSink),
            None => Box::new(WebhookClient::new(self.timeout)?),
        };
        Ok(CostNotifier {
            defaults: self.defaults,
            today: self.today,
            source,
            sink,
        })
    }
}

// ---------------------------------------------------------------------------
// CostNotifier
// ---------------------------------------------------------------------------

/// The invocation entry point.
///
/// Holds no per-invocation state: every call to [`handle()`](Self::handle)
/// parses its own config and builds its own report.
pub struct CostNotifier {
    defaults: NotifierDefaults,
    today: Option<NaiveDate>,
    source: Box<dyn CostSource>,
    sink: Box<dyn MessageSink>,
}

impl CostNotifier {
    /// Create a new builder for configuring the notifier.
    pub fn builder() -> CostNotifierBuilder {
        CostNotifierBuilder::default()
    }

    /// Access the cost fetcher bound to this notifier's billing source.
    pub fn costs(&self) -> CostFetcher<'_> {
        CostFetcher::new(self.source.as_ref())
    }

    /// The date reports are computed for: the pinned date, or today in UTC.
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    pub fn defaults(&self) -> &NotifierDefaults {
        &self.defaults
    }

    /// Run one invocation, propagating the first error.
    ///
    /// Parses the event, fetches costs, formats the embed, and delivers it.
    /// Returns the parsed config and the report that was sent.
    pub async fn run(&self, event: &Value) -> Result<(InvocationConfig, CostReport)> {
        let config = InvocationConfig::from_event(event, &self.defaults)?;
        let report = self.costs().fetch_report(self.today(), &config.report).await?;

        let embed = crate::report::build_embed(&report, &self.defaults);
        let message = WebhookMessage::new(&config.notifier, None, Some(embed))?;
        self.sink.deliver(&config.notifier, &message).await?;

        Ok((config, report))
    }

    /// Run one invocation and convert the outcome into an
    /// [`InvocationResult`]. Never fails: any error becomes a 500 result.
    pub async fn handle(&self, event: &Value) -> InvocationResult {
        match self.run(event).await {
            Ok((config, report)) => {
                info!("cost notification completed");
                InvocationResult::success(config, report)
            }
            Err(e) => {
                error!(error = %e, "cost notification failed");
                InvocationResult::failure(&e)
            }
        }
    }
}

impl fmt::Display for CostNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CostNotifier(username={}, today={})",
            self.defaults.username,
            self.today
                .map(|d| d.to_string())
                .unwrap_or_else(|| "utc".to_string())
        )
    }
}

// ---------------------------------------------------------------------------
// Event files
// ---------------------------------------------------------------------------

/// Read a scheduler event from a JSON file.
pub fn load_event<P: AsRef<Path>>(path: P) -> Result<Value> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_event(&contents)
}

/// Parse a scheduler event from a JSON string. The top level must be an
/// object.
pub fn parse_event(contents: &str) -> Result<Value> {
    let event: Value = serde_json::from_str(contents)?;
    if !event.is_object() {
        return Err(NotifierError::InvalidArgument(format!(
            "event must be a JSON object, got {}",
            json_kind(&event)
        )));
    }
    Ok(event)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
