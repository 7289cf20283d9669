// src/history.rs
//! Past forecasts: retrieval, filtering by commodity, newest-first ordering, selection.

use std::cmp::Reverse;

use chrono::{DateTime, NaiveDateTime, Utc};
use metrics::counter;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::commodity::CommodityType;
use crate::error::TransportError;
use crate::metrics::{self as m, HISTORY_FETCH_ERRORS_TOTAL, HISTORY_FETCH_TOTAL};
use crate::report::ForecastResponse;
use crate::submission::error_message;

/// One stored forecast. `result` is the whole stored document, routed as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub coffee_type: String,
    pub timestamp: String,
    pub result: ForecastResponse,
}

impl HistoryEntry {
    /// Entries that are not objects or carry no `coffee_type` are not usable.
    pub fn from_value(v: Value) -> Option<Self> {
        let coffee_type = v.get("coffee_type")?.as_str()?.to_string();
        let timestamp = v
            .get("timestamp")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self {
            coffee_type,
            timestamp,
            result: ForecastResponse::from(v),
        })
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// RFC 3339, or naive ISO-8601 (as the service writes it) read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Keep `commodity` entries, newest first. Unparseable timestamps go last, in input order.
pub fn select_for(entries: Vec<HistoryEntry>, commodity: CommodityType) -> Vec<HistoryEntry> {
    let mut kept: Vec<HistoryEntry> = entries
        .into_iter()
        .filter(|e| e.coffee_type == commodity.slug())
        .collect();
    kept.sort_by_cached_key(|e| {
        let ts = e.recorded_at();
        (ts.is_none(), Reverse(ts))
    });
    kept
}

/// Ordered entries plus the active selection (defaults to the newest).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryView {
    entries: Vec<HistoryEntry>,
    selected: Option<usize>,
}

impl HistoryView {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        let selected = if entries.is_empty() { None } else { Some(0) };
        Self { entries, selected }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected(&self) -> Option<&HistoryEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Make entry `index` active. Out of range leaves the selection unchanged.
    pub fn select(&mut self, index: usize) -> Option<&HistoryEntry> {
        if index < self.entries.len() {
            self.selected = Some(index);
            self.entries.get(index)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryClient {
    http: Client,
    url: String,
}

impl HistoryClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch everything, keep `commodity`, newest first. An empty list is not an error.
    pub async fn fetch_history(&self, commodity: CommodityType) -> Result<HistoryView, TransportError> {
        m::ensure_described();
        match self.fetch_all().await {
            Ok(all) => {
                let total = all.len();
                let entries = select_for(all, commodity);
                counter!(HISTORY_FETCH_TOTAL).increment(1);
                info!(
                    target: "history",
                    commodity = %commodity,
                    total,
                    kept = entries.len(),
                    "history fetched"
                );
                Ok(HistoryView::new(entries))
            }
            Err(e) => {
                counter!(HISTORY_FETCH_ERRORS_TOTAL).increment(1);
                warn!(target: "history", commodity = %commodity, error = %e, "history fetch failed");
                Err(e)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<HistoryEntry>, TransportError> {
        let request_error = |source: reqwest::Error| TransportError::Request {
            url: self.url.clone(),
            source,
        };
        let rsp = self.http.get(&self.url).send().await.map_err(request_error)?;
        let status = rsp.status();
        let body = rsp.bytes().await.map_err(request_error)?;
        if !status.is_success() {
            return Err(TransportError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        let items: Vec<Value> = serde_json::from_slice(&body).map_err(|e| TransportError::Decode {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        Ok(items.into_iter().filter_map(HistoryEntry::from_value).collect())
    }
}

/// Last good history list for one commodity plus its selection.
#[derive(Debug)]
pub struct HistoryBrowser {
    client: HistoryClient,
    commodity: CommodityType,
    view: Option<HistoryView>,
}

impl HistoryBrowser {
    pub fn new(client: HistoryClient, commodity: CommodityType) -> Self {
        Self {
            client,
            commodity,
            view: None,
        }
    }

    /// Re-fetch. On failure the previous list (and selection) stays as it was.
    pub async fn refresh(&mut self) -> Result<&HistoryView, TransportError> {
        let view = self.client.fetch_history(self.commodity).await?;
        Ok(self.view.insert(view))
    }

    /// `None` until the first successful refresh.
    pub fn view(&self) -> Option<&HistoryView> {
        self.view.as_ref()
    }

    pub fn select(&mut self, index: usize) -> Option<&HistoryEntry> {
        self.view.as_mut()?.select(index)
    }
}
