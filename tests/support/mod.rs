#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chargepoint_console::api::{ApiRequest, ApiResponse, Transport};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Scripted backend: answers requests in order and remembers what was sent.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    responses: Arc<Mutex<VecDeque<Result<ApiResponse>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    calls: Arc<AtomicUsize>,
    delay_ms: u64,
}

impl RecordingTransport {
    pub fn with_responses(responses: Vec<Result<ApiResponse>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Default::default()
        }
    }

    /// Each call sleeps before answering, to widen race windows.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn targets(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|r| r.target.clone())
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted response left")))
    }
}

pub fn ok(body: Value) -> Result<ApiResponse> {
    Ok(ApiResponse::new(StatusCode::OK, body.to_string()))
}

pub fn status(code: u16, body: &str) -> Result<ApiResponse> {
    let status = StatusCode::from_u16(code).expect("valid status code");
    Ok(ApiResponse::new(status, body))
}

pub fn unreachable() -> Result<ApiResponse> {
    Err(anyhow!("connection refused"))
}

pub fn page(ids: &[i64], total: u64) -> Result<ApiResponse> {
    let data: Vec<Value> = ids.iter().map(|id| serde_json::json!({ "id": id })).collect();
    ok(serde_json::json!({
        "total": total,
        "totalElement": data.len(),
        "page": 0,
        "size": data.len(),
        "data": data,
    }))
}
