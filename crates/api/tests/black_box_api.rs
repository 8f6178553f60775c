use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use stockpilot_auth::{JwtClaims, Role};
use stockpilot_core::UserId;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = stockpilot_api::app::build_app(jwt_secret.to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, roles: Vec<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        roles,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn widget_body(sku: &str, stock: i64, threshold: i64) -> serde_json::Value {
    json!({
        "sku": sku,
        "name": format!("Widget {sku}"),
        "stock": stock,
        "threshold": threshold,
        "price_cents": 1299,
    })
}

#[tokio::test]
async fn health_is_open_and_protected_routes_require_auth() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_token_identity() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, vec![Role::new("admin")]);

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "admin"));
}

#[tokio::test]
async fn item_lifecycle_create_update_alert_resolve_po() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    // Create: 10 > 5, so no alert yet.
    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&widget_body("WM-001", 10, 5))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let item: serde_json::Value = res.json().await.unwrap();
    let item_id = item["id"].as_str().unwrap().to_string();

    // Drop stock 10 -> 3: Sale movement plus one unresolved alert.
    let res = client
        .put(format!("{}/items/{}", srv.base_url, item_id))
        .bearer_auth(&token)
        .json(&json!({ "stock": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/alerts", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let alerts: serde_json::Value = res.json().await.unwrap();
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["item"]["sku"], "WM-001");
    assert_eq!(alerts[0]["item"]["stock"], 3);
    let alert_id = alerts[0]["id"].as_str().unwrap().to_string();

    // Audit trail: one Create and one Sale with a balanced delta.
    let res = client
        .get(format!("{}/movements", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let movements: serde_json::Value = res.json().await.unwrap();
    let movements = movements.as_array().unwrap();
    assert_eq!(movements.len(), 2);
    let sale = movements
        .iter()
        .find(|m| m["action"] == "Sale")
        .expect("sale movement");
    assert_eq!(sale["quantity"], -7);
    assert_eq!(sale["old_stock"], 10);
    assert_eq!(sale["new_stock"], 3);

    // Generate a PO; a second attempt conflicts.
    let res = client
        .put(format!("{}/alerts/{}/generate-po", srv.base_url, alert_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["po_generated"], true);
    assert_eq!(body["resolved"], false);

    let res = client
        .put(format!("{}/alerts/{}/generate-po", srv.base_url, alert_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Resolve; the unresolved list is empty afterwards.
    let res = client
        .put(format!("{}/alerts/{}/resolve", srv.base_url, alert_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["resolved"], true);

    let res = client
        .get(format!("{}/alerts", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let remaining: serde_json::Value = res.json().await.unwrap();
    assert!(remaining.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn staff_role_is_limited_to_stock_mutation() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let admin = mint_jwt(jwt_secret, vec![Role::new("admin")]);
    let staff = mint_jwt(jwt_secret, vec![Role::new("staff")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&staff)
        .json(&widget_body("WM-001", 10, 5))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&admin)
        .json(&widget_body("WM-001", 10, 5))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let item: serde_json::Value = res.json().await.unwrap();
    let item_id = item["id"].as_str().unwrap();

    let res = client
        .put(format!("{}/items/{}", srv.base_url, item_id))
        .bearer_auth(&staff)
        .json(&json!({ "stock": 8 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_sku_and_invalid_fields_are_reported() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&widget_body("WM-001", 10, 5))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&widget_body("WM-001", 4, 2))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_sku");

    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&widget_body("", -2, 5))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_failed");
    assert!(body["fields"]["sku"].is_string());
    assert!(body["fields"]["stock"].is_string());
}

#[tokio::test]
async fn deleting_an_item_removes_its_alerts() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/items", srv.base_url))
        .bearer_auth(&token)
        .json(&widget_body("WM-001", 10, 5))
        .send()
        .await
        .unwrap();
    let item: serde_json::Value = res.json().await.unwrap();
    let item_id = item["id"].as_str().unwrap().to_string();

    client
        .put(format!("{}/items/{}", srv.base_url, item_id))
        .bearer_auth(&token)
        .json(&json!({ "stock": 2 }))
        .send()
        .await
        .unwrap();

    let res = client
        .delete(format!("{}/items/{}", srv.base_url, item_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/items/{}", srv.base_url, item_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/alerts?resolved=all", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let alerts: serde_json::Value = res.json().await.unwrap();
    assert!(alerts.as_array().unwrap().is_empty());

    // The audit trail keeps the deletion on record.
    let res = client
        .get(format!("{}/movements?action=Delete", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let movements: serde_json::Value = res.json().await.unwrap();
    assert_eq!(movements.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn summary_report_counts_low_stock() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    for (sku, stock) in [("WM-001", 10), ("GX-900", 2)] {
        let res = client
            .post(format!("{}/items", srv.base_url))
            .bearer_auth(&token)
            .json(&widget_body(sku, stock, 5))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!("{}/reports/summary", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["low_stock_count"], 1);
    assert_eq!(body["inventory_value_cents"], 12 * 1299);
}
