// src/lib.rs
//! Data intake and submission workflow for coffee farmgate price forecasts.
//!
//! A session collects the five factor files a forecast needs (two commodity-specific
//! series plus three shared macro-economic factors), gates submission on completeness,
//! posts the files as one multipart request, and reads back stored results.

pub mod commodity;
pub mod config;
pub mod deletion;
pub mod error;
pub mod factor;
pub mod history;
pub mod intake;
pub mod metrics;
pub mod report;
pub mod store;
pub mod submission;
pub mod telemetry;
pub mod transfer;
pub mod validation;

// ---- Re-exports for stable public API ----
pub use crate::commodity::{CommodityType, FactorId, MainFactorKind, RequiredSet, SharedFactor};
pub use crate::config::ServiceConfig;
pub use crate::error::{IntakeError, TransportError, ValidationError};
pub use crate::factor::{Factor, FactorFile, FactorSet};
pub use crate::history::{HistoryBrowser, HistoryClient, HistoryEntry, HistoryView};
pub use crate::intake::{ForecastOutcome, IntakeController};
pub use crate::report::{ForecastReport, ForecastResponse};
pub use crate::store::FactorStore;
pub use crate::submission::{ForecastRequest, SubmissionClient};
pub use crate::validation::ValidationGate;

/// History client for the configured service, sharing the same HTTP settings.
pub fn history_client(cfg: &ServiceConfig) -> anyhow::Result<HistoryClient> {
    Ok(HistoryClient::new(cfg.http_client()?, cfg.history_url()))
}
