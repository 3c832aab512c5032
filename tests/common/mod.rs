//! Shared test fixtures for the cost notifier integration tests.
//!
//! Provides an in-memory billing source, message sinks that record or fail,
//! and a one-shot local HTTP responder standing in for the Discord webhook.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_cost_notifier::models::{BillingQuery, CostRecord, WebhookMessage};
use aws_cost_notifier::{CostSource, MessageSink, NotifierConfig, NotifierError};
use chrono::NaiveDate;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const WEBHOOK_URL: &str = "https://discord.com/api/webhooks/123456789/abc-DEF_ghi";

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// The scheduler event used across tests, with the given detail object.
pub fn event(detail: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "version": "0",
        "id": "test-event-id",
        "detail-type": "Scheduled Event",
        "source": "aws.events",
        "account": "123456789012",
        "time": "2024-03-05T09:00:00Z",
        "region": "us-east-1",
        "resources": [],
        "detail": detail
    })
}

// -- MockCostSource -----------------------------------------------------------

/// Billing source answering from a table keyed by query start date.
///
/// Unknown start dates return no rows. Every query is recorded.
#[derive(Clone, Default)]
pub struct MockCostSource {
    amounts: Arc<HashMap<NaiveDate, Vec<f64>>>,
    calls: Arc<Mutex<Vec<BillingQuery>>>,
    fail_with: Option<String>,
}

impl MockCostSource {
    /// Answer queries starting on `start` with one row per amount.
    pub fn with(mut self, start: &str, amounts: &[f64]) -> Self {
        Arc::make_mut(&mut self.amounts).insert(date(start), amounts.to_vec());
        self
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::default()
        }
    }

    /// Recorded queries, sorted by start date.
    pub fn calls(&self) -> Vec<BillingQuery> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort_by_key(|q| q.start);
        calls
    }
}

#[async_trait]
impl CostSource for MockCostSource {
    async fn cost_records(&self, query: &BillingQuery) -> aws_cost_notifier::Result<Vec<CostRecord>> {
        self.calls.lock().unwrap().push(*query);
        if let Some(msg) = &self.fail_with {
            return Err(NotifierError::Upstream(msg.clone()));
        }
        let rows = self
            .amounts
            .get(&query.start)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|amount| CostRecord {
                period_start: query.start.to_string(),
                amount,
                unit: Some("USD".to_string()),
            })
            .collect();
        Ok(rows)
    }
}

// -- Sinks --------------------------------------------------------------------

/// Sink that keeps every delivered message.
#[derive(Clone, Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<(NotifierConfig, WebhookMessage)>>>,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<(NotifierConfig, WebhookMessage)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(&self, config: &NotifierConfig, message: &WebhookMessage) -> aws_cost_notifier::Result<()> {
        self.delivered
            .lock()
            .unwrap()
            .push((config.clone(), message.clone()));
        Ok(())
    }
}

/// Sink that always reports a non-2xx response.
pub struct FailingSink {
    pub status: u16,
}

#[async_trait]
impl MessageSink for FailingSink {
    async fn deliver(&self, _config: &NotifierConfig, _message: &WebhookMessage) -> aws_cost_notifier::Result<()> {
        Err(NotifierError::Delivery {
            status: self.status,
            body: "simulated failure".to_string(),
        })
    }
}

// -- Local webhook responder --------------------------------------------------

/// Accept one HTTP request on a local port and answer with `status` and
/// `body`. The join handle yields the raw request text.
pub async fn spawn_responder(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
        request
    });

    (format!("http://{addr}/api/webhooks/123456789/token"), handle)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// The JSON body of a raw HTTP request.
pub fn request_json(request: &str) -> serde_json::Value {
    let (_, body) = request.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}
