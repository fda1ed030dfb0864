//! Integration tests for the automation webhooks.

use axum::http::StatusCode;
use reliefhub_database::ItemStore;

use crate::helpers::{self, TestApp, WEBHOOK_SECRET};

#[tokio::test]
async fn test_match_request_dispatches_item_list() {
    let app = TestApp::new();
    app.seed_match_scenario().await;

    let response = app
        .request(
            "POST",
            "/webhook/add-supplies-to-delivery",
            Some(serde_json::json!({
                "deliveryId": 68,
                "fromSiteWssId": [100],
                "toSiteWssId": [200],
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "Matches: 1");

    let sent = app.sent_to("/add-to-delivery", 1).await;
    assert_eq!(
        sent,
        vec![serde_json::json!({ "deliveryId": 68, "itemList": ["Water"] })]
    );
}

#[tokio::test]
async fn test_match_request_for_unsynced_sites() {
    let app = TestApp::new();
    app.seed_match_scenario().await;

    let response = app
        .request(
            "POST",
            "/webhook/add-supplies-to-delivery",
            Some(serde_json::json!({
                "deliveryId": 68,
                "fromSiteWssId": [],
                "toSiteWssId": [200],
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "No matches, sites are not in WSS");
}

#[tokio::test]
async fn test_match_request_missing_fields_rejected() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/webhook/add-supplies-to-delivery",
            Some(serde_json::json!({ "fromSiteWssId": [100], "toSiteWssId": [200] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_delivery_upsert_replaces_items() {
    let app = TestApp::new();
    app.seed_match_scenario().await;

    let response = app
        .request(
            "POST",
            "/webhook/update-delivery",
            Some(helpers::delivery_update(68, &[161, 191], "Creating Dispatch")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"]["itemList"],
        serde_json::json!(["Tarps", "Water"])
    );

    let response = app
        .request(
            "POST",
            "/webhook/update-delivery",
            Some(helpers::delivery_update(68, &[191], "In Progress")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/delivery/QWER", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let delivery = &response.body["data"];
    assert_eq!(delivery["deliveryId"], 68);
    assert_eq!(delivery["status"], "In Progress");
    assert_eq!(delivery["itemList"], serde_json::json!(["Tarps"]));
    assert_eq!(delivery["fromSite"]["name"], "Hub");
    assert_eq!(delivery["toSite"]["name"], "Center");
    assert_eq!(delivery["targetDeliveryDate"], "2024-12-13");
}

#[tokio::test]
async fn test_delivery_upsert_clears_empty_fields() {
    let app = TestApp::new();
    app.seed_match_scenario().await;

    app.request(
        "POST",
        "/webhook/update-delivery",
        Some(helpers::delivery_update(68, &[161], "In Progress")),
    )
    .await;

    let mut cleared = helpers::delivery_update(68, &[161], "In Progress");
    cleared["driverName"] = serde_json::json!([]);
    cleared["driverNumber"] = serde_json::json!([]);
    cleared["licensePlateNumbers"] = serde_json::json!([]);
    let response = app
        .request("POST", "/webhook/update-delivery", Some(cleared))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let delivery = &response.body["data"];
    assert!(delivery["driverName"].is_null());
    assert!(delivery["driverNumber"].is_null());
    assert!(delivery["licensePlateNumbers"].is_null());
    assert_eq!(delivery["dispatcherName"], "Dana");
}

#[tokio::test]
async fn test_delivery_upsert_with_unknown_site_rejected() {
    let app = TestApp::new();
    app.seed_match_scenario().await;

    let mut body = helpers::delivery_update(68, &[161], "In Progress");
    body["pickupSiteWssId"] = serde_json::json!([999]);
    let response = app
        .request("POST", "/webhook/update-delivery", Some(body))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.request("GET", "/delivery/QWER", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delivery_delete() {
    let app = TestApp::new();
    app.seed_match_scenario().await;

    app.request(
        "POST",
        "/webhook/update-delivery",
        Some(helpers::delivery_update(68, &[161, 191], "In Progress")),
    )
    .await;

    let response = app.request("DELETE", "/webhook/delivery/68", None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request("GET", "/delivery/QWER", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Invalid delivery ID: QWER");

    // Unknown references are a silent no-op.
    let response = app.request("DELETE", "/webhook/delivery/68", None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_item_import() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/import/update/inventory-item",
            Some(serde_json::json!({ "airtableId": 161, "itemName": "  Water " })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let item = app.memory.find_by_name("Water").await.unwrap().unwrap();
    assert_eq!(item.wss_id, Some(161));

    let response = app
        .request(
            "POST",
            "/import/update/inventory-item",
            Some(serde_json::json!({ "airtableId": 162 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_secret_enforced_when_configured() {
    let app = TestApp::with_config(|config| {
        config.webhook.secret = Some(WEBHOOK_SECRET.to_string());
    });
    app.seed_match_scenario().await;
    let body = serde_json::json!({
        "deliveryId": 68,
        "fromSiteWssId": [100],
        "toSiteWssId": [200],
    });

    let response = app
        .request("POST", "/webhook/add-supplies-to-delivery", Some(body.clone()))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request_with_headers(
            "POST",
            "/webhook/add-supplies-to-delivery",
            Some(body.clone()),
            &[("X-Webhook-Secret", "wrong")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request_with_headers(
            "POST",
            "/webhook/add-supplies-to-delivery",
            Some(body),
            &[("X-Webhook-Secret", WEBHOOK_SECRET)],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "Matches: 1");

    let response = app
        .request(
            "POST",
            "/import/update/inventory-item",
            Some(serde_json::json!({ "airtableId": 161, "itemName": "Water" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Public endpoints are not behind the secret.
    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
}
