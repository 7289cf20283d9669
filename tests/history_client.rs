// tests/history_client.rs
//
// History retrieval against the fake service: commodity filter, newest-first order,
// default selection, and keeping the last good list when a refresh fails.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use coffee_forecast_intake::{CommodityType, HistoryBrowser, HistoryClient, TransportError};
use common::{dead_url, history_row, FakeService};

fn client(svc: &FakeService) -> HistoryClient {
    HistoryClient::new(reqwest::Client::new(), svc.history_url())
}

fn markers(view: &coffee_forecast_intake::HistoryView) -> Vec<u64> {
    view.entries()
        .iter()
        .map(|e| e.result.as_value()["marker"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn filters_by_type_and_orders_newest_first() {
    let svc = FakeService::start().await;
    svc.set_history_reply(
        StatusCode::OK,
        json!([
            history_row("arabica", "2025-01-01T08:00:00", 1),
            history_row("robusta", "2025-06-01T08:00:00", 99),
            history_row("arabica", "2025-03-01T08:00:00", 3),
            history_row("arabica", "2025-02-01T08:00:00", 2),
        ]),
    );

    let view = client(&svc).fetch_history(CommodityType::Arabica).await.unwrap();
    assert_eq!(view.len(), 3);
    assert_eq!(markers(&view), vec![3, 2, 1]);
    assert_eq!(view.selected_index(), Some(0));
    assert_eq!(view.selected().unwrap().timestamp, "2025-03-01T08:00:00");
    assert!(view.entries().iter().all(|e| e.coffee_type == "arabica"));
    assert_eq!(svc.history_calls(), 1);
}

#[tokio::test]
async fn selected_entry_carries_the_stored_report() {
    let svc = FakeService::start().await;
    svc.set_history_reply(
        StatusCode::OK,
        json!([history_row("excelsa", "2025-04-10T09:30:00.250000", 7)]),
    );

    let view = client(&svc).fetch_history(CommodityType::Excelsa).await.unwrap();
    let report = view.selected().unwrap().result.report().expect("report shape");
    assert_eq!(report.experimental_model.mape, 0.9);
    assert_eq!(report.control_future_forecast.forecast_values.len(), 4);
}

#[tokio::test]
async fn empty_or_unmatched_history_is_ok_with_no_selection() {
    let svc = FakeService::start().await;
    let view = client(&svc).fetch_history(CommodityType::Robusta).await.unwrap();
    assert!(view.is_empty());
    assert_eq!(view.selected(), None);

    svc.set_history_reply(
        StatusCode::OK,
        json!([history_row("arabica", "2025-01-01T00:00:00", 1)]),
    );
    let view = client(&svc).fetch_history(CommodityType::Robusta).await.unwrap();
    assert!(view.is_empty());
    assert_eq!(view.selected_index(), None);
}

#[tokio::test]
async fn mixed_timestamp_formats_sort_by_instant() {
    let svc = FakeService::start().await;
    svc.set_history_reply(
        StatusCode::OK,
        json!([
            history_row("robusta", "not a date", 0),
            history_row("robusta", "2025-05-01T11:00:00", 1),
            history_row("robusta", "2025-05-01T14:00:00+02:00", 2), // 12:00 UTC
            history_row("robusta", "2025-05-01T10:30:00.5Z", 3),
            { "timestamp": "2030-01-01T00:00:00" },
        ]),
    );

    let view = client(&svc).fetch_history(CommodityType::Robusta).await.unwrap();
    assert_eq!(markers(&view), vec![2, 1, 3, 0]);
}

#[tokio::test]
async fn reselection_changes_active_entry_only_in_range() {
    let svc = FakeService::start().await;
    svc.set_history_reply(
        StatusCode::OK,
        json!([
            history_row("arabica", "2025-01-01T00:00:00", 1),
            history_row("arabica", "2025-02-01T00:00:00", 2),
        ]),
    );

    let mut browser = HistoryBrowser::new(client(&svc), CommodityType::Arabica);
    assert!(browser.view().is_none());
    browser.refresh().await.unwrap();

    let picked = browser.select(1).unwrap();
    assert_eq!(picked.result.as_value()["marker"], 1);
    assert!(browser.select(5).is_none());
    assert_eq!(browser.view().unwrap().selected_index(), Some(1));
}

#[tokio::test]
async fn failed_refresh_keeps_previous_list() {
    let svc = FakeService::start().await;
    svc.set_history_reply(
        StatusCode::OK,
        json!([
            history_row("arabica", "2025-01-01T00:00:00", 1),
            history_row("arabica", "2025-02-01T00:00:00", 2),
        ]),
    );
    let mut browser = HistoryBrowser::new(client(&svc), CommodityType::Arabica);
    browser.refresh().await.unwrap();
    browser.select(1);

    svc.set_history_reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "db offline" }));
    match browser.refresh().await {
        Err(TransportError::Status { status, message, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "db offline");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    let view = browser.view().expect("previous list kept");
    assert_eq!(view.len(), 2);
    assert_eq!(view.selected_index(), Some(1));
    assert_eq!(svc.history_calls(), 2);
}

#[tokio::test]
async fn unreachable_service_is_a_request_error() {
    let client = HistoryClient::new(reqwest::Client::new(), dead_url("/api/history").await);
    let err = client.fetch_history(CommodityType::Arabica).await.unwrap_err();
    assert!(matches!(err, TransportError::Request { .. }), "got {err}");
}

#[tokio::test]
async fn non_list_body_is_a_decode_error() {
    let svc = FakeService::start().await;
    svc.set_history_reply(StatusCode::OK, json!({ "items": [] }));
    let err = client(&svc).fetch_history(CommodityType::Arabica).await.unwrap_err();
    assert!(matches!(err, TransportError::Decode { .. }), "got {err}");
}
