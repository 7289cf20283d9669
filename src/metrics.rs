// src/metrics.rs
//! Counter names and one-time descriptions. Recording is a no-op until the host
//! installs a `metrics` recorder.

use metrics::describe_counter;
use once_cell::sync::OnceCell;

pub const UPLOADS_TOTAL: &str = "intake_uploads_total";
pub const DELETES_TOTAL: &str = "intake_deletes_total";
pub const TRANSFER_FAILURES_TOTAL: &str = "intake_transfer_failures_total";
pub const SUBMISSIONS_TOTAL: &str = "forecast_submissions_total";
pub const BLOCKED_TOTAL: &str = "forecast_blocked_total";
pub const TRANSPORT_ERRORS_TOTAL: &str = "forecast_transport_errors_total";
pub const HISTORY_FETCH_TOTAL: &str = "history_fetch_total";
pub const HISTORY_FETCH_ERRORS_TOTAL: &str = "history_fetch_errors_total";

/// One-time metrics registration (so series show up with help text).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(UPLOADS_TOTAL, "Factor uploads that settled successfully.");
        describe_counter!(DELETES_TOTAL, "Confirmed factor deletions that settled.");
        describe_counter!(
            TRANSFER_FAILURES_TOTAL,
            "Upload/delete transfers that failed; factor state left unchanged."
        );
        describe_counter!(SUBMISSIONS_TOTAL, "Forecast requests answered successfully.");
        describe_counter!(
            BLOCKED_TOTAL,
            "Forecast runs stopped by the validation gate (no network call)."
        );
        describe_counter!(
            TRANSPORT_ERRORS_TOTAL,
            "Forecast submissions that failed in transport or at the service."
        );
        describe_counter!(HISTORY_FETCH_TOTAL, "History lists fetched successfully.");
        describe_counter!(HISTORY_FETCH_ERRORS_TOTAL, "History fetches that failed.");
    });
}
