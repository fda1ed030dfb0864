//! Integration tests for the site inventory API.

use axum::http::StatusCode;
use reliefhub_database::InventoryStore;
use reliefhub_entity::inventory::ItemStatus;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_add_item_created_once() {
    let app = TestApp::new();

    let body = serde_json::json!({ "itemName": "Baby Wipes" });
    let response = app.request("POST", "/api/items", Some(body.clone())).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["created"], true);

    let response = app.request("POST", "/api/items", Some(body)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["created"], false);

    let sent = app.sent_to("/new-item", 1).await;
    assert_eq!(sent, vec![serde_json::json!({ "item-name": "Baby Wipes" })]);

    let response = app
        .request("POST", "/api/items", Some(serde_json::json!({ "itemName": "" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_and_deactivate_inventory() {
    let app = TestApp::new();
    let (hub, _center) = app.seed_match_scenario().await;
    let path = format!("/api/sites/{}/inventory", hub.id);

    let response = app
        .request(
            "PUT",
            &path,
            Some(serde_json::json!({ "itemName": "Tarps", "status": "Oversupply" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let entries = app.memory.site_inventory(hub.id).await.unwrap();
    let tarps = entries.iter().find(|e| e.item_name == "Tarps").unwrap();
    assert_eq!(tarps.status, ItemStatus::Oversupply);

    let response = app
        .request("DELETE", &format!("{path}/Water"), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let entries = app.memory.site_inventory(hub.id).await.unwrap();
    assert!(entries.iter().all(|e| e.item_name != "Water"));

    let sent = app.sent_to("/inventory", 2).await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().any(|body| body["active"] == false));
}

#[tokio::test]
async fn test_inventory_rejections() {
    let app = TestApp::new();
    let (hub, _center) = app.seed_match_scenario().await;

    let response = app
        .request(
            "PUT",
            &format!("/api/sites/{}/inventory", hub.id),
            Some(serde_json::json!({ "itemName": "Tarps", "status": "plenty" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "PUT",
            "/api/sites/9999/inventory",
            Some(serde_json::json!({ "itemName": "Tarps", "status": "Needed" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "PUT",
            &format!("/api/sites/{}/inventory", hub.id),
            Some(serde_json::json!({ "itemName": "Unicorns", "status": "Needed" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_site_flags() {
    let app = TestApp::new();
    let (_hub, center) = app.seed_match_scenario().await;

    let response = app
        .request(
            "PUT",
            &format!("/api/sites/{}/flags", center.id),
            Some(serde_json::json!({ "acceptingDonations": false })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["active"], true);
    assert_eq!(response.body["data"]["acceptingDonations"], false);
    assert_eq!(response.body["data"]["siteType"], "Distribution Center");

    let sent = app.sent_to("/site", 1).await;
    assert_eq!(sent[0]["siteWssId"], 200);

    let response = app
        .request(
            "PUT",
            "/api/sites/9999/flags",
            Some(serde_json::json!({ "active": false })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "memory");
    assert_eq!(response.body["data"]["notifications"], true);
}
