use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pantry_server::{build_app, build_router, AppOptions, AppState};
use pantry_core::{Catalog, IndexHandle, InventoryModel, Product, RankingConfig, TextIndex};
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

const INVENTORY: &str = r#"{
    "items": [
        {"name": "Milk", "stock": 0.9, "last_buy": 2},
        {"name": "Cheese", "stock": 0.1, "last_buy": 45},
        {"name": "Snacks", "stock": 0.2, "last_buy": 35}
    ]
}"#;

const CATALOG: &str = "\
{\"name\":\"Unexpected Cheddar Cheese\",\"price\":\"$3.99\",\"category\":\"Cheese\"}
{\"name\":\"Organic Whole Milk\",\"price\":\"$4.29\",\"category\":\"Beverages\"}
{\"name\":\"Brie Cheese Bites\",\"price\":\"$5.49\",\"category\":\"Cheese\"}
{\"name\":\"Sea Salt Potato Chips\",\"category\":\"Snacks\"}
";

fn app_from_files(dir: &std::path::Path) -> Router {
    fs::write(dir.join("catalog.jsonl"), CATALOG).unwrap();
    fs::write(dir.join("inventory.json"), INVENTORY).unwrap();
    build_app(AppOptions {
        catalog: Some(dir.join("catalog.jsonl").to_string_lossy().to_string()),
        index: None,
        inventory: Some(dir.join("inventory.json").to_string_lossy().to_string()),
        config: None,
    })
    .unwrap()
}

fn app_with_token(catalog_path: std::path::PathBuf, token: &str) -> Router {
    build_router(AppState {
        index: Arc::new(IndexHandle::new(TextIndex::build(&Catalog::new(vec![Product::new("Gouda", "$6.00", "Cheese")])))),
        inventory: Arc::new(InventoryModel::from_reader(INVENTORY.as_bytes()).unwrap()),
        config: Arc::new(RankingConfig::default()),
        catalog_path: Some(catalog_path),
        admin_token: Some(token.to_string()),
    })
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri).header("content-type", "application/json").body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn recommend_picks_cheese() {
    let dir = tempdir().unwrap();
    let app = app_from_files(dir.path());
    let (status, json) = send(app, post_json("/recommend", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["need"]["query"], "Cheese");
    let matches = json["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m["category"] == "Cheese"));
}

#[tokio::test]
async fn recommend_with_no_candidates_is_unprocessable() {
    let dir = tempdir().unwrap();
    let app = app_from_files(dir.path());
    let (status, json) = send(app, post_json("/recommend", r#"{"needs": []}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn rank_orders_by_urgency() {
    let dir = tempdir().unwrap();
    let app = app_from_files(dir.path());
    let (status, json) = send(app, post_json("/rank", r#"{"needs": ["Milk", "Bread", "Cheese"]}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Vec<&str> = json.as_array().unwrap().iter().map(|n| n["query"].as_str().unwrap()).collect();
    assert_eq!(order, vec!["Cheese", "Bread", "Milk"]);
}

#[tokio::test]
async fn search_rejects_zero_k() {
    let dir = tempdir().unwrap();
    let app = app_from_files(dir.path());
    let (status, _) = send(app.clone(), Request::get("/search?q=cheese&k=0").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, json) = send(app, Request::get("/search?q=milk&k=1").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"][0]["name"], "Organic Whole Milk");
}

#[tokio::test]
async fn missing_catalog_serves_empty_results() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("inventory.json"), INVENTORY).unwrap();
    let app = build_app(AppOptions {
        catalog: Some(dir.path().join("missing.jsonl").to_string_lossy().to_string()),
        inventory: Some(dir.path().join("inventory.json").to_string_lossy().to_string()),
        ..Default::default()
    })
    .unwrap();
    let (status, json) = send(app, post_json("/recommend", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["need"]["query"], "Cheese");
    assert!(json["matches"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reload_swaps_index_for_authorized_callers() {
    let dir = tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.jsonl");
    fs::write(&catalog_path, CATALOG).unwrap();
    let app = app_with_token(catalog_path, "secret");

    let unauthorized = Request::post("/admin/reload").body(Body::empty()).unwrap();
    let (status, _) = send(app.clone(), unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, before) = send(app.clone(), Request::get("/search?q=brie").body(Body::empty()).unwrap()).await;
    assert!(before["results"].as_array().unwrap().is_empty());

    let req = Request::post("/admin/reload").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, json) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["num_docs"], 4);

    let (_, after) = send(app, Request::get("/search?q=brie").body(Body::empty()).unwrap()).await;
    assert_eq!(after["results"][0]["name"], "Brie Cheese Bites");
}
