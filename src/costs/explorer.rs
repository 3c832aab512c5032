//! AWS Cost Explorer billing source.

use std::future::Future;

use async_trait::async_trait;
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::operation::get_cost_and_usage::GetCostAndUsageOutput;
use aws_sdk_costexplorer::types::{DateInterval, Granularity as CeGranularity, ResultByTime};
use aws_sdk_costexplorer::Client;
use tracing::{debug, error};

use super::source::CostSource;
use crate::config::COST_EXPLORER_REGION;
use crate::error::{NotifierError, Result};
use crate::models::{BillingQuery, CostRecord, Granularity};

/// [`CostSource`] backed by `GetCostAndUsage`.
pub struct CostExplorerSource {
    client: Client,
}

impl CostExplorerSource {
    /// Load credentials from the environment and target the Cost Explorer
    /// region.
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(COST_EXPLORER_REGION))
            .load()
            .await;
        Self::new(Client::new(&config))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CostSource for CostExplorerSource {
    async fn cost_records(&self, query: &BillingQuery) -> Result<Vec<CostRecord>> {
        let start = query.start.format("%Y-%m-%d").to_string();
        let end = query.end.format("%Y-%m-%d").to_string();
        let granularity = match query.granularity {
            Granularity::Daily => CeGranularity::Daily,
            Granularity::Monthly => CeGranularity::Monthly,
        };

        let interval = DateInterval::builder()
            .start(&start)
            .end(&end)
            .build()
            .map_err(|e| NotifierError::Upstream(format!("Failed to build date interval: {e}")))?;

        collect_pages(query.metric(), &start, |token| {
            debug!(%start, %end, ?granularity, page = ?token, "querying Cost Explorer");
            let request = self
                .client
                .get_cost_and_usage()
                .time_period(interval.clone())
                .granularity(granularity.clone())
                .metrics(query.metric())
                .set_next_page_token(token);
            let (start, end) = (start.clone(), end.clone());
            async move {
                request.send().await.map_err(|e| {
                    let msg = DisplayErrorContext(&e).to_string();
                    error!(%start, %end, error = %msg, "cost data retrieval failed");
                    NotifierError::Upstream(msg)
                })
            }
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

/// Call `fetch` with the previous page token until the response carries no
/// further token, collecting the rows of every page.
pub async fn collect_pages<F, Fut>(
    metric: &str,
    fallback_start: &str,
    mut fetch: F,
) -> Result<Vec<CostRecord>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<GetCostAndUsageOutput>>,
{
    let mut records = Vec::new();
    let mut next_page: Option<String> = None;

    loop {
        let response = fetch(next_page.take()).await?;
        records.extend(parse_results(
            response.results_by_time(),
            metric,
            fallback_start,
        )?);

        match response.next_page_token() {
            Some(token) if !token.is_empty() => next_page = Some(token.to_string()),
            _ => break,
        }
    }

    Ok(records)
}

/// Convert `ResultsByTime` rows into [`CostRecord`]s.
///
/// A row without the metric counts as zero. A row without a time period is
/// dated `fallback_start`.
pub fn parse_results(
    results: &[ResultByTime],
    metric: &str,
    fallback_start: &str,
) -> Result<Vec<CostRecord>> {
    results
        .iter()
        .map(|result| {
            let period_start = result
                .time_period()
                .map(|tp| tp.start().to_string())
                .unwrap_or_else(|| fallback_start.to_string());

            let value = result.total().and_then(|t| t.get(metric));
            let amount = match value.and_then(|m| m.amount()) {
                Some(raw) => raw.parse::<f64>().map_err(|e| {
                    NotifierError::Upstream(format!(
                        "Unparseable {metric} amount {raw:?} for {period_start}: {e}"
                    ))
                })?,
                None => 0.0,
            };

            Ok(CostRecord {
                period_start,
                amount,
                unit: value.and_then(|m| m.unit()).map(str::to_string),
            })
        })
        .collect()
}
