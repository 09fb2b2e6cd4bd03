use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use dairy_store_api::config::AppConfig;
use dairy_store_api::services::{AdminService, BatchService, RetryConfig};
use dairy_store_api::storage::{MemoryBatchStore, MemoryRecordStore};
use dairy_store_api::AppState;

/// Test harness: the full router over unseeded in-memory stores, driven with
/// `tower::ServiceExt::oneshot` so no socket is bound.
pub struct TestApp {
    router: Router,
    #[allow(dead_code)]
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let batches = Arc::new(MemoryBatchStore::new());
        let records = Arc::new(MemoryRecordStore::new());
        let retry = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        };

        let state = AppState {
            batch_service: BatchService::with_retry(batches.clone(), records.clone(), retry),
            admin_service: AdminService::new(batches, records),
            config: AppConfig::new(
                "sqlite::memory:".into(),
                "127.0.0.1".into(),
                18_000,
                "test".into(),
            ),
            db: None,
        };

        let router = dairy_store_api::api_routes().with_state(state.clone());
        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request should not fail at the transport level");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, payload)
    }

    #[allow(dead_code)]
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    #[allow(dead_code)]
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
