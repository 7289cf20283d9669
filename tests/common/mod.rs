// tests/common/mod.rs
//
// In-process stand-in for the forecasting service, bound to 127.0.0.1:0.
// Records every multipart submission so tests can assert on the exact payload.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

use coffee_forecast_intake::{FactorFile, SubmissionClient};

pub const FORECAST_FIXTURE: &str = include_str!("../fixtures/forecast_response.json");

#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    body: Value,
}

#[derive(Clone)]
pub struct FakeService {
    received: Arc<Mutex<Vec<Vec<ReceivedPart>>>>,
    history_calls: Arc<Mutex<usize>>,
    forecast: Arc<Mutex<Reply>>,
    history: Arc<Mutex<Reply>>,
    pub base_url: String,
}

impl FakeService {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake service");
        let addr = listener.local_addr().expect("local addr");

        let svc = FakeService {
            received: Arc::new(Mutex::new(Vec::new())),
            history_calls: Arc::new(Mutex::new(0)),
            forecast: Arc::new(Mutex::new(Reply {
                status: StatusCode::OK,
                body: serde_json::from_str(FORECAST_FIXTURE).expect("fixture json"),
            })),
            history: Arc::new(Mutex::new(Reply {
                status: StatusCode::OK,
                body: json!([]),
            })),
            base_url: format!("http://{addr}"),
        };

        let app = Router::new()
            .route("/forecast", post(forecast))
            .route("/api/history", get(history))
            .with_state(svc.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake service");
        });
        svc
    }

    pub fn forecast_url(&self) -> String {
        format!("{}/forecast", self.base_url)
    }

    pub fn history_url(&self) -> String {
        format!("{}/api/history", self.base_url)
    }

    pub fn submission_client(&self) -> SubmissionClient {
        SubmissionClient::new(reqwest::Client::new(), self.forecast_url())
    }

    pub fn set_forecast_reply(&self, status: StatusCode, body: Value) {
        *self.forecast.lock() = Reply { status, body };
    }

    pub fn set_history_reply(&self, status: StatusCode, body: Value) {
        *self.history.lock() = Reply { status, body };
    }

    /// Every submission received so far, parts in arrival order.
    pub fn submissions(&self) -> Vec<Vec<ReceivedPart>> {
        self.received.lock().clone()
    }

    pub fn history_calls(&self) -> usize {
        *self.history_calls.lock()
    }
}

async fn forecast(State(svc): State<FakeService>, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.expect("field bytes").to_vec();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    svc.received.lock().push(parts);
    let reply = svc.forecast.lock().clone();
    (reply.status, Json(reply.body))
}

async fn history(State(svc): State<FakeService>) -> (StatusCode, Json<Value>) {
    *svc.history_calls.lock() += 1;
    let reply = svc.history.lock().clone();
    (reply.status, Json(reply.body))
}

/// A URL nothing listens on (port taken, then released).
pub async fn dead_url(path: &str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}{path}")
}

pub fn csv(file_name: &str, body: &str) -> FactorFile {
    FactorFile::new(file_name, body.as_bytes().to_vec())
}

pub fn history_row(coffee_type: &str, timestamp: &str, marker: u32) -> Value {
    let mut row: Value = serde_json::from_str(FORECAST_FIXTURE).expect("fixture json");
    row["coffee_type"] = json!(coffee_type);
    row["timestamp"] = json!(timestamp);
    row["marker"] = json!(marker);
    row
}
