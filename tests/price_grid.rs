mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};
use supervisor_console::api::{ApiClient, ApiError};
use supervisor_console::grid::{GridController, GridTimings, SaveStatus};
use supervisor_console::listing::{ListController, ListQuery};
use supervisor_console::models::price::PriceField;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEBOUNCE: Duration = Duration::from_millis(150);

fn client(server: &MockServer) -> ApiClient {
    common::init_test_tracing();
    ApiClient::new(&server.uri(), Duration::from_secs(5))
        .unwrap()
        .with_token("grid-token")
}

fn timings() -> GridTimings {
    GridTimings {
        save_debounce: DEBOUNCE,
        success_display: Duration::from_millis(400),
    }
}

async fn mount_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "priceId": 11, "productName": "Kettle", "costPrice": 100, "profitRatio": 20,
                  "logisticCost": 5, "porterageCost": 3, "otherPrice1": 150 },
                { "priceId": 12, "productName": "Toaster", "costPrice": null }
            ],
            "page": 1, "pageSize": 20, "total": 2, "totalPages": 1,
            "ccSingleRatioValue": 1.03, "ccInstallmentRatioValue": 1.1
        })))
        .mount(server)
        .await;
}

async fn patch_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn loaded_rows_carry_derived_prices() {
    let server = MockServer::start().await;
    mount_page(&server).await;

    let grid = GridController::with_timings(client(&server), timings());
    grid.load(&ListQuery::default()).await.unwrap();

    let kettle = grid.row(11).unwrap();
    assert_eq!(kettle.price, Some(144.0));
    assert_eq!(kettle.cc_single_price, Some(144.0 * 1.03));
    assert!((kettle.dealer_cash_margin_pct.unwrap() - 4.1667).abs() < 1e-4);

    let toaster = grid.row(12).unwrap();
    assert_eq!(toaster.price, None);
    assert_eq!(toaster.dealer_cc_installment_margin_pct, None);
}

#[tokio::test]
async fn quick_successive_edits_are_saved_once() {
    let server = MockServer::start().await;
    mount_page(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/prices/bulk-update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updated": 1 })))
        .mount(&server)
        .await;

    let grid = GridController::with_timings(client(&server), timings());
    grid.load(&ListQuery::default()).await.unwrap();

    grid.edit_text(11, PriceField::CostPrice, "1.250,50");
    tokio::time::sleep(Duration::from_millis(50)).await;
    grid.edit(11, PriceField::ProfitRatio, Some(10.0));

    tokio::time::sleep(DEBOUNCE + Duration::from_millis(150)).await;
    assert_eq!(
        patch_bodies(&server).await,
        vec![json!({ "items": [{ "priceId": 11, "costPrice": 1250.5, "profitRatio": 10.0 }] })]
    );
    assert_eq!(grid.status(11), SaveStatus::Succeeded);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(grid.status(11), SaveStatus::Idle);
}

#[tokio::test]
async fn rejected_save_flags_row_and_surfaces_message() {
    let server = MockServer::start().await;
    mount_page(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/prices/bulk-update"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Price is locked for campaign" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let grid = GridController::with_timings(client(&server), timings());
    grid.load(&ListQuery::default()).await.unwrap();
    grid.edit(12, PriceField::CostPrice, Some(40.0));

    tokio::time::sleep(DEBOUNCE + Duration::from_millis(500)).await;
    assert_eq!(
        grid.status(12),
        SaveStatus::Failed("Price is locked for campaign".into())
    );
    assert_eq!(grid.page_error().as_deref(), Some("Price is locked for campaign"));
    assert_eq!(grid.row(12).unwrap().cost_price, Some(40.0));
}

#[tokio::test]
async fn unauthorized_response_invokes_hook() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let hook_calls = Arc::clone(&calls);
    let client = client(&server).on_unauthorized(Arc::new(move || {
        hook_calls.fetch_add(1, Ordering::SeqCst);
    }));

    let grid = GridController::new(client);
    let err = grid.load(&ListQuery::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(grid.page_error().is_some());
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Brand {
    id: i64,
    name: String,
}

#[tokio::test]
async fn list_controller_reloads_brands_on_filter_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/brands"))
        .and(query_param("isActive", "true"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": 1, "name": "Arzum" }],
            "page": 1, "pageSize": 20, "total": 1, "totalPages": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/brands"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [], "page": 4, "pageSize": 20, "total": 61, "totalPages": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = ListController::new(client(&server).list::<Brand>("brands"));
    list.set_page(4).await.unwrap();
    assert_eq!(list.view().total, 61);

    list.set_active_only(true).await.unwrap();
    let view = list.view();
    assert_eq!(view.page, 1);
    assert_eq!(
        view.items,
        vec![Brand {
            id: 1,
            name: "Arzum".into()
        }]
    );
}
