//! End-to-end tests of the HTTP surface against an in-memory database.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use moto_api::{app, ApiConfig, AppState};
use moto_db::{Database, DbConfig};

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    app(AppState::new(db, &ApiConfig::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_product(app: &Router, name: &str, sku: &str, sell_price: i64, stock: i64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/products",
        Some(json!({
            "name": name,
            "brand": "HONDA",
            "category": "Kampas Rem",
            "masterCategory": "Pengereman",
            "skuManual": sku,
            "buyPrice": sell_price - 3_500,
            "sellPrice": sell_price,
            "stock": stock,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

async fn stock_of(app: &Router, id: &str) -> i64 {
    let (_, body) = send(app, Method::GET, &format!("/api/products/{}", id), None).await;
    body["stock"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_checkout_and_return() {
    let app = test_app().await;
    let brake = create_product(&app, "Kampas Rem Depan", "HON-KR-01", 18_500, 10).await;
    let plug = create_product(&app, "Busi Iridium", "HON-BS-01", 6_500, 4).await;

    let (status, sale) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({
            "items": [
                { "id": brake, "quantity": 1, "price": 18500 },
                { "id": plug, "quantity": 1, "price": 6500 },
            ],
            "paymentAmount": 30000,
            "changeAmount": 5000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", sale);
    assert_eq!(sale["totalAmount"], 25_000);
    assert_eq!(sale["status"], "SUCCESS");
    assert_eq!(sale["items"].as_array().unwrap().len(), 2);
    assert_eq!(stock_of(&app, &brake).await, 9);
    assert_eq!(stock_of(&app, &plug).await, 3);

    let sale_id = sale["id"].as_str().unwrap().to_string();
    let uri = format!("/api/transactions/{}", sale_id);

    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], sale_id.as_str());

    // only the exact status values start a return
    let (status, untouched) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "return" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(untouched["status"], "SUCCESS");
    assert_eq!(stock_of(&app, &brake).await, 9);

    let (status, returned) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "RETUR" }))).await;
    assert_eq!(status, StatusCode::OK, "{}", returned);
    assert_eq!(returned["status"], "RETURNED");
    assert_eq!(stock_of(&app, &brake).await, 10);
    assert_eq!(stock_of(&app, &plug).await, 4);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "RETURN" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Transaction is already returned");
    assert_eq!(stock_of(&app, &brake).await, 10);
}

#[tokio::test]
async fn test_insufficient_stock_is_conflict() {
    let app = test_app().await;
    let brake = create_product(&app, "Kampas Rem Depan", "HON-KR-01", 18_500, 5).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({
            "items": [{ "id": brake, "quantity": 10, "price": 18500 }],
            "paymentAmount": 185000,
            "changeAmount": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Insufficient stock for Kampas Rem Depan" }));
    assert_eq!(stock_of(&app, &brake).await, 5);

    let (_, history) = send(&app, Method::GET, "/api/transactions", None).await;
    assert!(history["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_rejects_bad_bodies() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({ "items": [], "paymentAmount": 0, "changeAmount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No items in cart");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({
            "items": [{ "id": "PRD-1", "quantity": true, "price": 10000 }],
            "paymentAmount": 10000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("items[0].quantity"), "{}", body);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/transactions")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_transaction() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/transactions/TRS-NOPE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Transaction not found");

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/transactions/TRS-NOPE",
        Some(json!({ "status": "RETURN" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_total_amount_is_immutable() {
    let app = test_app().await;
    let brake = create_product(&app, "Kampas Rem Depan", "HON-KR-01", 18_500, 5).await;
    let (_, sale) = send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({
            "items": [{ "id": brake, "quantity": 1, "price": 18500 }],
            "paymentAmount": 20000,
            "changeAmount": 1500,
        })),
    )
    .await;
    let uri = format!("/api/transactions/{}", sale["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "totalAmount": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "totalAmount cannot be changed");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "isComplete": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isComplete"], false);
    assert_eq!(body["totalAmount"], 18_500);

    // deleting keeps the sold stock off the shelf
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock_of(&app, &brake).await, 4);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_list_and_category_refresh() {
    let app = test_app().await;
    create_product(&app, "Kampas Rem Depan", "HON-KR-01", 18_500, 5).await;

    let (status, page) = send(&app, Method::GET, "/api/products?brand=HONDA", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["categories"], json!(["Kampas Rem"]));
    assert_eq!(page["masterCategories"], json!(["Pengereman"]));
    assert_eq!(page["pagination"]["hasMore"], false);

    // a new category must show up without waiting for the cache to expire
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "name": "Busi Iridium",
            "brand": "HONDA",
            "category": "Busi",
            "masterCategory": "Kelistrikan",
            "sellPrice": 6500,
            "stock": 3,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, page) = send(&app, Method::GET, "/api/products?brand=HONDA", None).await;
    assert_eq!(page["totalCount"], 2);
    assert_eq!(page["categories"], json!(["Busi", "Kampas Rem"]));

    let (status, page) = send(&app, Method::GET, "/api/products?search=busi", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["products"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/api/products?brand=VESPA", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_sku_is_conflict() {
    let app = test_app().await;
    create_product(&app, "Kampas Rem Depan", "HON-KR-01", 18_500, 5).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "name": "Kampas Rem Belakang",
            "brand": "HONDA",
            "category": "Kampas Rem",
            "masterCategory": "Pengereman",
            "skuManual": "HON-KR-01",
            "sellPrice": 17000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_profit_and_dashboard() {
    let app = test_app().await;
    let brake = create_product(&app, "Kampas Rem Depan", "HON-KR-01", 18_500, 5).await;
    send(
        &app,
        Method::POST,
        "/api/transactions",
        Some(json!({
            "items": [{ "id": brake, "quantity": 2, "price": 18500 }],
            "paymentAmount": 40000,
            "changeAmount": 3000,
        })),
    )
    .await;

    let today = chrono::Utc::now().date_naive();
    let start = today - chrono::Duration::days(2);
    let (status, report) = send(
        &app,
        Method::GET,
        &format!("/api/profit?start={}&end={}", start, today),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let days = report["groupedData"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["grossIncome"], 0);
    assert_eq!(days[2]["date"], today.to_string());
    assert_eq!(days[2]["grossIncome"], 37_000);
    assert_eq!(days[2]["netIncome"], 7_000);

    let (status, _) = send(&app, Method::GET, "/api/profit?start=2024-06-02", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, summary) = send(&app, Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalStock"], 1);
    assert_eq!(summary["lowStockCount"], 1);
    assert_eq!(summary["totalAmount"], 37_000);
    assert_eq!(summary["totalQuantity"], 2);

    let (_, best) = send(&app, Method::GET, "/api/dashboard/best-sellers", None).await;
    assert_eq!(best["products"][0]["totalSold"], 2);

    let (_, low) = send(&app, Method::GET, "/api/dashboard/low-stock", None).await;
    assert_eq!(low["products"][0]["id"], brake.as_str());

    let (_, recent) = send(&app, Method::GET, "/api/dashboard/recent-transactions", None).await;
    assert_eq!(recent["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_shop_data() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/shopdata", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "My Store");
    let uri = format!("/api/shopdata/{}", body["data"]["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "storeName": "Bengkel Jaya" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bengkel Jaya");

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/shopdata/SHOP-NOPE",
        Some(json!({ "storeName": "Other" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
