// src/error.rs
//! Error taxonomy for the intake workflow.
//!
//! Every variant is recoverable: after any error the session keeps its state and the
//! caller may retry the same action or take a different one.

/// Main error type returned by intake, submission and history operations.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// One or more required factors are missing; no network call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network or service failure (submission, history, or a factor transfer).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Upload/delete referenced a name outside the known main and shared factors.
    #[error("unknown factor: '{name}'")]
    UnknownFactor { name: String },

    /// Commodity slug the forecasting service is not configured for.
    #[error("unknown commodity type: '{slug}'")]
    UnknownCommodity { slug: String },

    /// File name does not carry an accepted extension (.csv / .xlsx).
    #[error("unsupported file '{file_name}' for {name}: expected a .csv or .xlsx file")]
    UnsupportedFile { name: String, file_name: String },

    /// `confirm_delete` without a preceding `request_delete`.
    #[error("no deletion is pending confirmation")]
    NoPendingDeletion,
}

impl IntakeError {
    pub(crate) fn unknown_factor(name: impl Into<String>) -> Self {
        Self::UnknownFactor { name: name.into() }
    }

    /// Missing factor names when this is a validation failure.
    pub fn missing(&self) -> Option<&[String]> {
        match self {
            Self::Validation(v) => Some(&v.missing),
            _ => None,
        }
    }
}

/// Required factors absent at submission time, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required factors: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

/// Failure talking to the forecasting service or completing a factor transfer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// The service answered 2xx but reported a failure in the body.
    #[error("forecast service reported an error: {message}")]
    Service { message: String },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("transfer of '{factor}' failed: {message}")]
    Transfer { factor: String, message: String },
}
