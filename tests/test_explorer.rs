//! Cost Explorer response handling: row parsing and page collection.

use aws_cost_notifier::costs::explorer::{collect_pages, parse_results};
use aws_cost_notifier::models::UNBLENDED_COST;
use aws_cost_notifier::NotifierError;
use aws_sdk_costexplorer::operation::get_cost_and_usage::GetCostAndUsageOutput;
use aws_sdk_costexplorer::types::{DateInterval, MetricValue, ResultByTime};

fn row(start: &str, end: &str, amount: Option<&str>) -> ResultByTime {
    let interval = DateInterval::builder().start(start).end(end).build().unwrap();
    let builder = ResultByTime::builder().time_period(interval);
    match amount {
        Some(amount) => builder
            .total(
                UNBLENDED_COST,
                MetricValue::builder().amount(amount).unit("USD").build(),
            )
            .build(),
        None => builder.build(),
    }
}

fn page(rows: Vec<ResultByTime>, token: Option<&str>) -> GetCostAndUsageOutput {
    GetCostAndUsageOutput::builder()
        .set_results_by_time(Some(rows))
        .set_next_page_token(token.map(str::to_string))
        .build()
}

// ---------------------------------------------------------------------------
// parse_results
// ---------------------------------------------------------------------------

#[test]
fn rows_are_parsed_with_amount_and_unit() {
    let records = parse_results(
        &[
            row("2024-03-01", "2024-03-02", Some("12.5")),
            row("2024-03-02", "2024-03-03", Some("0.0000001")),
        ],
        UNBLENDED_COST,
        "2024-03-01",
    )
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].period_start, "2024-03-01");
    assert_eq!(records[0].amount, 12.5);
    assert_eq!(records[0].unit.as_deref(), Some("USD"));
    assert_eq!(records[1].period_start, "2024-03-02");
    assert_eq!(records[1].amount, 0.0000001);
}

#[test]
fn missing_metric_counts_as_zero() {
    let records = parse_results(
        &[row("2024-03-01", "2024-03-02", None)],
        UNBLENDED_COST,
        "2024-03-01",
    )
    .unwrap();
    assert_eq!(records[0].amount, 0.0);
    assert!(records[0].unit.is_none());
}

#[test]
fn other_metrics_are_ignored() {
    let records = parse_results(
        &[row("2024-03-01", "2024-03-02", Some("3.0"))],
        "BlendedCost",
        "2024-03-01",
    )
    .unwrap();
    assert_eq!(records[0].amount, 0.0);
}

#[test]
fn row_without_time_period_uses_fallback_start() {
    let records = parse_results(&[ResultByTime::builder().build()], UNBLENDED_COST, "2024-02-01")
        .unwrap();
    assert_eq!(records[0].period_start, "2024-02-01");
}

#[test]
fn unparseable_amount_is_upstream_error() {
    let err = parse_results(
        &[row("2024-03-01", "2024-03-02", Some("twelve"))],
        UNBLENDED_COST,
        "2024-03-01",
    )
    .unwrap_err();

    match err {
        NotifierError::Upstream(msg) => {
            assert!(msg.contains("Unparseable UnblendedCost amount"), "{msg}");
            assert!(msg.contains("2024-03-01"), "{msg}");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[test]
fn empty_response_has_no_records() {
    assert!(parse_results(&[], UNBLENDED_COST, "2024-03-01").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// collect_pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pages_are_followed_until_token_runs_out() {
    let mut pages = vec![
        page(vec![row("2024-03-01", "2024-03-02", Some("1.5"))], Some("page-2")),
        page(vec![row("2024-03-02", "2024-03-03", Some("2.5"))], Some("page-3")),
        page(vec![row("2024-03-03", "2024-03-04", Some("4.0"))], None),
    ]
    .into_iter();
    let mut tokens = Vec::new();

    let records = collect_pages(UNBLENDED_COST, "2024-03-01", |token| {
        tokens.push(token);
        let next = pages.next();
        async move { next.ok_or_else(|| NotifierError::Upstream("no more pages".into())) }
    })
    .await
    .unwrap();

    assert_eq!(
        tokens,
        vec![None, Some("page-2".to_string()), Some("page-3".to_string())]
    );
    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![1.5, 2.5, 4.0]);
}

#[tokio::test]
async fn empty_token_ends_pagination() {
    let mut calls = 0;
    let records = collect_pages(UNBLENDED_COST, "2024-03-01", |_| {
        calls += 1;
        let out = page(vec![row("2024-03-01", "2024-03-02", Some("7"))], Some(""));
        async move { Ok(out) }
    })
    .await
    .unwrap();

    assert_eq!(calls, 1);
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn failing_page_stops_collection() {
    let mut calls = 0;
    let err = collect_pages(UNBLENDED_COST, "2024-03-01", |token| {
        calls += 1;
        let result = match token {
            None => Ok(page(vec![], Some("page-2"))),
            Some(_) => Err(NotifierError::Upstream("ThrottlingException".into())),
        };
        async move { result }
    })
    .await
    .unwrap_err();

    assert_eq!(calls, 2);
    assert!(err.to_string().contains("ThrottlingException"));
}
