//! API integration tests

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use reqwest::multipart;
use serde_json::{json, Value};
use sportstock_server::{
    api,
    config::AppConfig,
    repository::{memory::MemoryStore, Repository},
    services::Services,
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::{spawn_app, TestApp};

fn assert_price(value: &Value, expected: f64) {
    let price = value.as_f64().expect("price is not a number");
    assert!((price - expected).abs() < 1e-9, "price {} != {}", price, expected);
}

async fn list(app: &TestApp) -> Vec<Value> {
    app.http
        .get(app.url("/equipment"))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

async fn create_ball(app: &TestApp) -> Value {
    let category_id = app.category_id("Basketball").await;
    let response = app
        .http
        .post(app.url("/equipment"))
        .json(&json!({
            "name": "Test Equipment",
            "brand": "Test Brand",
            "category_id": category_id,
            "price": 99.99,
            "condition": "New",
            "quantity": 3
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app
        .http
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");

    let response = app.http.get(app.url("/ready")).send().await.unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_create_then_list() {
    let app = spawn_app().await;
    let before = list(&app).await.len();

    let created = create_ball(&app).await;
    assert!(Uuid::parse_str(created["id"].as_str().unwrap()).is_ok());
    assert_eq!(created["name"], "Test Equipment");
    assert_price(&created["price"], 99.99);
    assert_eq!(created["category_name"], "Basketball");

    let items = list(&app).await;
    assert_eq!(items.len(), before + 1);
    let listed = items
        .iter()
        .find(|item| item["id"] == created["id"])
        .expect("Created item missing from listing");
    for field in ["name", "brand", "category_id", "condition", "quantity"] {
        assert_eq!(listed[field], created[field], "field {} differs", field);
    }
    assert_price(&listed["price"], 99.99);
    assert_eq!(listed["brand"], "Test Brand");
    assert_eq!(listed["condition"], "New");
    assert_eq!(listed["quantity"], 3);

    let response = app
        .http
        .get(app.url(&format!("/equipment/{}", created["id"].as_str().unwrap())))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_missing_fields() {
    let app = spawn_app().await;

    let response = app
        .http
        .post(app.url("/equipment"))
        .json(&json!({ "name": "Test Equipment" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Missing required fields: brand, category_id, price, condition"
    );
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["code"], 18);
}

#[tokio::test]
async fn test_create_rejects_negative_values() {
    let app = spawn_app().await;
    let category_id = app.category_id("Tennis").await;

    for (price, quantity) in [(-10.0, 1), (10.0, -1)] {
        let response = app
            .http
            .post(app.url("/equipment"))
            .json(&json!({
                "name": "Racket",
                "brand": "Acme",
                "category_id": category_id,
                "price": price,
                "condition": "Good",
                "quantity": quantity
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_filter_by_category() {
    let app = spawn_app().await;
    let tennis = app.category_id("Tennis").await;

    let response = app
        .http
        .post(app.url("/equipment/filter"))
        .json(&json!({ "category_id": tennis }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let items: Vec<Value> = response.json().await.unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item["category_id"] == tennis.as_str()));
}

#[tokio::test]
async fn test_filter_sorts_by_price() {
    let app = spawn_app().await;

    let prices = |items: Vec<Value>| -> Vec<f64> {
        items.iter().map(|item| item["price"].as_f64().unwrap()).collect()
    };

    let items: Vec<Value> = app
        .http
        .post(app.url("/equipment/filter"))
        .json(&json!({ "category_id": "All", "sort_by": "price", "sort_order": "desc" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let desc = prices(items);
    assert_eq!(desc.len(), 10);
    assert!(desc.windows(2).all(|w| w[0] >= w[1]));
    assert!((desc[0] - 299.99).abs() < 1e-9);

    let items: Vec<Value> = app
        .http
        .post(app.url("/equipment/filter"))
        .json(&json!({ "sort_order": "low-high" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let asc = prices(items);
    assert!(asc.windows(2).all(|w| w[0] <= w[1]));
    assert!((asc[0] - 19.99).abs() < 1e-9);
}

#[tokio::test]
async fn test_filter_rejects_unknown_sort() {
    let app = spawn_app().await;

    let response = app
        .http
        .post(app.url("/equipment/filter"))
        .json(&json!({ "sort_by": "name", "sort_order": "asc" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_equipment() {
    let app = spawn_app().await;
    let created = create_ball(&app).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .http
        .put(app.url("/equipment"))
        .query(&[("id", id)])
        .json(&json!({ "price": 49.5, "condition": "Fair" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["id"], created["id"]);
    assert_price(&updated["price"], 49.5);
    assert_eq!(updated["condition"], "Fair");
    assert_eq!(updated["name"], "Test Equipment");
}

#[tokio::test]
async fn test_update_unknown_and_missing_id() {
    let app = spawn_app().await;

    let response = app
        .http
        .put(app.url("/equipment"))
        .query(&[("id", Uuid::new_v4().to_string())])
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .http
        .put(app.url("/equipment"))
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "ID is required (query parameter)");
}

#[tokio::test]
async fn test_delete_equipment() {
    let app = spawn_app().await;
    let created = create_ball(&app).await;
    let id = created["id"].as_str().unwrap();
    let before = list(&app).await.len();

    let response = app
        .http
        .delete(app.url("/equipment"))
        .query(&[("id", id)])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let items = list(&app).await;
    assert_eq!(items.len(), before - 1);
    assert!(items.iter().all(|item| item["id"] != created["id"]));

    let response = app
        .http
        .delete(app.url("/equipment"))
        .query(&[("id", id)])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id() {
    let app = spawn_app().await;

    let response = app
        .http
        .get(app.url("/equipment/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_categories() {
    let app = spawn_app().await;

    let response = app
        .http
        .post(app.url("/categories"))
        .json(&json!({ "name": "Swimming" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let categories: Vec<Value> = app
        .http
        .get(app.url("/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = categories.iter().filter_map(|c| c["name"].as_str()).collect();
    assert_eq!(
        names,
        vec!["Basketball", "Football/Soccer", "Swimming", "Tennis", "Training"]
    );

    let response = app
        .http
        .post(app.url("/categories"))
        .json(&json!({ "name": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_is_served() {
    let app = spawn_app().await;

    let part = multipart::Part::bytes(b"fake image".to_vec()).file_name("ball.png");
    let form = multipart::Form::new().part("file", part);
    let response = app
        .http
        .post(app.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let filename = body["filename"].as_str().unwrap();
    assert!(filename.starts_with("/uploads/"));
    assert!(filename.ends_with("-ball.png"));

    let served = app
        .http
        .get(format!("{}{}", app.root_url, filename))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"fake image");
}

#[tokio::test]
async fn test_upload_without_file() {
    let app = spawn_app().await;

    let form = multipart::Form::new().text("note", "no file here");
    let response = app
        .http
        .post(app.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let services = Services::new(
        Repository::memory(MemoryStore::new()),
        AppConfig::default().uploads,
    );
    let app = api::router(AppState::new(AppConfig::default(), services));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/equipment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "BadValue");
}
