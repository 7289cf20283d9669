// src/submission.rs
//! Multipart forecast request: assembly and the single round trip to the service.

use metrics::counter;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::commodity::CommodityType;
use crate::error::TransportError;
use crate::factor::FactorFile;
use crate::metrics::{self as m, SUBMISSIONS_TOTAL, TRANSPORT_ERRORS_TOTAL};
use crate::report::ForecastResponse;

/// Name of the scalar part carrying the commodity slug.
pub const TYPE_PART: &str = "type";

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Uploaded files keyed by exact display name, plus the commodity discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    commodity: CommodityType,
    parts: Vec<(String, FactorFile)>,
}

impl ForecastRequest {
    pub fn new(commodity: CommodityType) -> Self {
        Self {
            commodity,
            parts: Vec::new(),
        }
    }

    /// Add a file part. A second part under the same name replaces the first.
    pub fn insert(&mut self, name: impl Into<String>, file: FactorFile) {
        let name = name.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = file,
            None => self.parts.push((name, file)),
        }
    }

    pub fn commodity(&self) -> CommodityType {
        self.commodity
    }

    pub fn parts(&self) -> &[(String, FactorFile)] {
        &self.parts
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// One file part per factor (original name and bytes) and the `type` text part.
    /// Part names go out verbatim (`name="Net Return"`), not RFC 2231 encoded.
    pub fn to_form(&self) -> reqwest::Result<Form> {
        let mut form = Form::new().percent_encode_noop();
        for (name, file) in &self.parts {
            let part = Part::bytes(file.bytes().to_vec())
                .file_name(file.file_name().to_string())
                .mime_str(file.content_type())?;
            form = form.part(name.clone(), part);
        }
        Ok(form.text(TYPE_PART, self.commodity.slug()))
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionClient {
    http: Client,
    url: String,
}

impl SubmissionClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and return the document unmodified. No retries.
    pub async fn send(&self, request: &ForecastRequest) -> Result<ForecastResponse, TransportError> {
        m::ensure_described();
        let result = self.send_inner(request).await;
        match &result {
            Ok(_) => {
                counter!(SUBMISSIONS_TOTAL).increment(1);
                info!(
                    target: "submission",
                    commodity = %request.commodity(),
                    parts = request.parts().len(),
                    "forecast received"
                );
            }
            Err(e) => {
                counter!(TRANSPORT_ERRORS_TOTAL).increment(1);
                warn!(target: "submission", commodity = %request.commodity(), error = %e, "forecast request failed");
            }
        }
        result
    }

    async fn send_inner(&self, request: &ForecastRequest) -> Result<ForecastResponse, TransportError> {
        let form = request.to_form().map_err(|source| self.request_error(source))?;
        info!(
            target: "submission",
            url = %self.url,
            commodity = %request.commodity(),
            parts = ?request.part_names().collect::<Vec<_>>(),
            "sending forecast request"
        );

        let rsp = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| self.request_error(source))?;

        let status = rsp.status();
        let body = rsp.bytes().await.map_err(|source| self.request_error(source))?;
        if !status.is_success() {
            return Err(TransportError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        let value: Value = serde_json::from_slice(&body).map_err(|e| TransportError::Decode {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        if let Some(message) = reported_error(&value) {
            return Err(TransportError::Service { message });
        }
        Ok(ForecastResponse::from(value))
    }

    fn request_error(&self, source: reqwest::Error) -> TransportError {
        TransportError::Request {
            url: self.url.clone(),
            source,
        }
    }
}

/// `{"error": "..."}` message from a failed response, else a trimmed raw body.
pub(crate) fn error_message(body: &[u8], fallback: Option<&str>) -> String {
    if let Ok(v) = serde_json::from_slice::<Value>(body) {
        if let Some(msg) = reported_error(&v) {
            return msg;
        }
    }
    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if raw.is_empty() {
        return fallback.unwrap_or("no response body").to_string();
    }
    raw.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

// The service answers some model failures with 2xx and an `error` key at the top level.
fn reported_error(v: &Value) -> Option<String> {
    match v.get("error")? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
