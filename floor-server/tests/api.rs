//! HTTP surface through `tower::ServiceExt::oneshot`

mod common;

use axum::Router;
use axum::body::Body;
use floor_server::api;
use floor_server::table_lock::TableLockRegistry;
use floor_server::{Config, ServerState};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::*;

struct TestApp {
    router: Router,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let catalog = restaurant(&dead_station().await, &dead_station().await);
        let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        let state = ServerState::new(
            config,
            manager(catalog.clone()),
            TableLockRegistry::spawn(),
            catalog,
        );
        Self {
            router: api::router(state),
            _dir: dir,
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        staff: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(staff) = staff {
            builder = builder.header("x-staff-id", staff);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, table_id: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/orders",
                Some(WAITER),
                Some(json!({
                    "table_id": table_id,
                    "items": [{"food_id": "plov", "quantity": 1}, {"food_id": "tea", "quantity": 2}],
                    "client_total": 35000
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (_, body) = app.call(Method::GET, "/health/detailed", None, None).await;
    assert_eq!(body["checks"]["storage"]["status"], "ok");
    assert_eq!(body["checks"]["table_locks"]["count"], 0);
}

#[tokio::test]
async fn test_create_requires_staff_header() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/orders",
            None,
            Some(json!({"table_id": "t-1", "items": [{"food_id": "plov", "quantity": 1}]})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 8003);
}

#[tokio::test]
async fn test_create_returns_order_and_print_results() {
    let app = TestApp::new().await;
    let body = app.create("t-1").await;

    assert_eq!(body["order"]["daily_number"], 1);
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["subtotal"], 35000.0);
    assert_eq!(body["print_results"].as_array().unwrap().len(), 2);
    assert_eq!(body["print_results"][0]["success"], false);

    let id = body["order"]["id"].as_str().unwrap();
    let (status, order) = app.call(Method::GET, &format!("/api/orders/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["table_name"], "Stol 1");

    let (_, busy) = app.call(Method::GET, "/api/orders/busy-tables", None, None).await;
    assert_eq!(busy, json!(["t-1"]));

    let (_, mine) = app
        .call(Method::GET, "/api/orders/my-pending", Some(WAITER), None)
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, by_table) = app.call(Method::GET, "/api/orders/table/t-1", None, None).await;
    assert_eq!(by_table[0]["id"], id);
}

#[tokio::test]
async fn test_validation_and_not_found_errors() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/orders",
            Some(WAITER),
            Some(json!({"table_id": "t-1", "items": []})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4007);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/orders",
            Some(WAITER),
            Some(json!({"table_id": "t-1", "items": [{"food_id": "lagman", "quantity": 1}]})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);

    let (status, body) = app.call(Method::GET, "/api/orders/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
    assert_eq!(body["details"]["order_id"], "nope");
}

#[tokio::test]
async fn test_status_conflict_names_current_status() {
    let app = TestApp::new().await;
    let id = app.create("t-2").await["order"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/orders/{id}/status");
    let (status, body) = app
        .call(Method::PUT, &uri, None, Some(json!({"status": "served"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "served");

    let (status, body) = app
        .call(Method::PUT, &uri, None, Some(json!({"status": "ready"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4009);
    assert_eq!(body["details"]["current_status"], "served");

    let (status, _) = app
        .call(Method::PUT, &uri, None, Some(json!({"status": "flying"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_close_pay_and_reports() {
    let app = TestApp::new().await;
    let id = app.create("t-3").await["order"]["id"].as_str().unwrap().to_string();

    // 35000 + 10 % service
    let (status, body) = app
        .call(Method::POST, &format!("/api/orders/{id}/close"), Some(WAITER), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "completed");
    assert_eq!(body["order"]["final_total"], 38500.0);
    assert_eq!(body["print_results"], json!([]));

    let (_, pending) = app
        .call(Method::GET, "/api/orders/pending-payments", None, None)
        .await;
    assert_eq!(pending[0]["id"], id.as_str());

    let payment_uri = format!("/api/orders/{id}/payment");
    let (status, body) = app
        .call(
            Method::POST,
            &payment_uri,
            Some(CASHIER),
            Some(json!({"method": "cash", "amount": 30000})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["required"], 38500.0);
    assert_eq!(body["details"]["provided"], 30000.0);

    let (status, body) = app
        .call(
            Method::POST,
            &payment_uri,
            Some(CASHIER),
            Some(json!({"method": "cash", "amount": 40000, "notes": "tip jar"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "paid");
    assert_eq!(body["order"]["change_amount"], 1500.0);

    let (status, body) = app
        .call(
            Method::POST,
            &payment_uri,
            Some(CASHIER),
            Some(json!({"method": "card", "amount": 38500})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["current_status"], "paid");

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/orders/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, paid) = app
        .call(Method::GET, "/api/orders/completed?paid=true", None, None)
        .await;
    assert_eq!(paid.as_array().unwrap().len(), 1);

    let (_, summary) = app
        .call(Method::GET, "/api/orders/daily-summary", None, None)
        .await;
    assert_eq!(summary["paid_orders"], 1);
    assert_eq!(summary["total_revenue"], 38500.0);

    let (status, _) = app
        .call(Method::GET, "/api/orders/daily-summary?date=15-03-2024", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_receipt_reprint_without_cashier_printer() {
    let app = TestApp::new().await;
    let id = app.create("t-4").await["order"]["id"].as_str().unwrap().to_string();
    app.call(Method::POST, &format!("/api/orders/{id}/close"), Some(WAITER), None)
        .await;

    let (status, body) = app
        .call(Method::POST, &format!("/api/orders/{id}/reprint"), Some(WAITER), None)
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], 9201);

    let (status, body) = app
        .call(Method::POST, &format!("/api/orders/{id}/reprint-kitchen"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_table_lock_mirror() {
    let app = TestApp::new().await;

    let (status, lock) = app
        .call(
            Method::POST,
            "/api/tables/t-5/lock",
            None,
            Some(json!({"holder_id": "w-1", "holder_name": "Aziza"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lock["holder_id"], "w-1");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/tables/t-5/lock",
            None,
            Some(json!({"holder_id": "w-2", "holder_name": "Bobur"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7003);
    assert_eq!(body["details"]["holder_name"], "Aziza");

    let (status, _) = app
        .call(Method::DELETE, "/api/tables/t-5/lock?holder_id=w-2", None, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, locks) = app.call(Method::GET, "/api/tables/locks", None, None).await;
    assert_eq!(locks.as_array().unwrap().len(), 1);

    let (status, body) = app
        .call(Method::DELETE, "/api/tables/t-5/lock?holder_id=w-1", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], true);

    let (_, tables) = app.call(Method::GET, "/api/tables", None, None).await;
    assert_eq!(tables.as_array().unwrap().len(), 6);
}
