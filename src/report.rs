// src/report.rs
//! Forecast result document.
//!
//! [`ForecastResponse`] is routed untouched from the service to the presentation layer.
//! [`ForecastReport`] is an optional typed view for consumers that want to read it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque JSON document produced by the forecasting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastResponse(Value);

impl ForecastResponse {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// `coffee_type` as echoed by the service, if present.
    pub fn coffee_type(&self) -> Option<&str> {
        self.0.get("coffee_type").and_then(Value::as_str)
    }

    pub fn report(&self) -> Result<ForecastReport, serde_json::Error> {
        ForecastReport::deserialize(&self.0)
    }
}

impl From<Value> for ForecastResponse {
    fn from(v: Value) -> Self {
        Self(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    #[serde(default)]
    pub coffee_type: Option<String>,
    pub control_model: ModelEvaluation,
    pub experimental_model: ModelEvaluation,
    pub control_future_forecast: FutureForecast,
    pub experimental_future_forecast: FutureForecast,
    /// Granger causality p-values keyed by lag/variable.
    #[serde(default)]
    pub granger_pvalues: Option<BTreeMap<String, f64>>,
}

/// Hold-out evaluation of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub forecast_dates: Vec<String>,
    pub forecast_values: Vec<f64>,
    pub actual_values: Vec<f64>,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MASE")]
    pub mase: f64,
    #[serde(rename = "MAPE")]
    pub mape: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureForecast {
    pub forecast_dates: Vec<String>,
    pub forecast_values: Vec<f64>,
}

impl ForecastReport {
    /// True when the model with the inflation rate beats the control on MAPE.
    pub fn experimental_outperforms(&self) -> bool {
        self.experimental_model.mape < self.control_model.mape
    }
}
