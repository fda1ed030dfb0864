//! Integration tests for public delivery tracking.

use axum::http::StatusCode;

use crate::helpers::{self, TRACKING_DOMAIN, TestApp, TestResponse, WEBHOOK_SECRET};

async fn app_with_delivery() -> TestApp {
    let app = TestApp::with_secret();
    app.seed_match_scenario().await;
    let response = app
        .request_with_headers(
            "POST",
            "/webhook/update-delivery",
            Some(helpers::delivery_update(68, &[161], "Creating Dispatch")),
            &[("X-Webhook-Secret", WEBHOOK_SECRET)],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    app
}

async fn confirm_link(app: &TestApp, key: &str, role: &str) -> TestResponse {
    app.request_with_headers(
        "GET",
        &format!("/webhook/confirm-link/{key}/{role}"),
        None,
        &[("X-Webhook-Secret", WEBHOOK_SECRET)],
    )
    .await
}

#[tokio::test]
async fn test_confirm_links_are_role_specific() {
    let app = app_with_delivery().await;

    let mut links = Vec::new();
    for role in ["pickup_site", "dropoff_site", "driver"] {
        let response = confirm_link(&app, "QWER", role).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["role"], role);
        let link = response.body["data"]["link"].as_str().unwrap().to_string();
        assert!(link.starts_with(&format!("{TRACKING_DOMAIN}/delivery/QWER?code=")));
        links.push(link);
    }

    // Codes are never shared across roles and never exposed in the tracking view.
    links.sort();
    links.dedup();
    assert_eq!(links.len(), 3);

    let response = app.request("GET", "/delivery/QWER", None).await;
    let confirmations = response.body["data"]["confirmations"].as_array().unwrap();
    assert_eq!(confirmations.len(), 3);
    assert!(confirmations.iter().all(|c| c.get("code").is_none()));
}

#[tokio::test]
async fn test_confirm_link_errors() {
    let app = app_with_delivery().await;

    let response = confirm_link(&app, "QWER", "passenger").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = confirm_link(&app, "NOPE", "driver").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirm_links_require_secret() {
    let app = app_with_delivery().await;

    for role in ["pickup_site", "dropoff_site", "driver"] {
        let path = format!("/webhook/confirm-link/QWER/{role}");
        let response = app.request("GET", &path, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(!response.text.contains("code="));

        let response = app
            .request_with_headers("GET", &path, None, &[("X-Webhook-Secret", "wrong")])
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    // The tracking view under the public key stays open.
    let response = app.request("GET", "/delivery/QWER", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_confirm_links_closed_without_configured_secret() {
    let app = TestApp::new();
    app.seed_match_scenario().await;
    app.request(
        "POST",
        "/webhook/update-delivery",
        Some(helpers::delivery_update(68, &[161], "Creating Dispatch")),
    )
    .await;

    let response = app
        .request("GET", "/webhook/confirm-link/QWER/driver", None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_change_notifies_with_links() {
    let app = app_with_delivery().await;

    let response = app
        .request_with_headers(
            "POST",
            "/webhook/update-delivery",
            Some(helpers::delivery_update(68, &[161], "Delivery Completed")),
            &[("X-Webhook-Secret", WEBHOOK_SECRET)],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let sent = app.sent_to("/delivery", 2).await;
    let completed = sent
        .iter()
        .find(|body| body["deliveryStatus"] == "Delivery Completed")
        .expect("completion notification sent");
    assert_eq!(completed["airtableId"], 68);

    let response = confirm_link(&app, "QWER", "dropoff_site").await;
    assert_eq!(completed["dropOffConfirmLink"], response.body["data"]["link"]);
}

#[tokio::test]
async fn test_site_deliveries() {
    let app = TestApp::new();
    let (hub, _center) = app.seed_match_scenario().await;

    for (delivery_id, key, date) in [(1, "EARLY", "2024-10-01"), (2, "LATE", "2024-11-01")] {
        let mut body = helpers::delivery_update(delivery_id, &[161], "In Progress");
        body["publicUrlKey"] = serde_json::json!(key);
        body["targetDeliveryDate"] = serde_json::json!(date);
        let response = app
            .request("POST", "/webhook/update-delivery", Some(body))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = app
        .request("GET", &format!("/api/sites/{}/deliveries", hub.id), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<i64> = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["deliveryId"].as_i64())
        .collect();
    assert_eq!(ids, vec![2, 1]);

    let response = app.request("GET", "/api/sites/9999/deliveries", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
