use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use curio_api::api::{create_router, AppState};
use curio_api::db::MemoryStore;
use curio_api::models::Item;
use curio_api::services::catalog::MemoryCatalog;
use curio_api::services::recommendations::EngineSettings;

fn reference_catalog() -> Vec<Item> {
    vec![
        Item::new("P1", ["daily"], ["A"]),
        Item::new("P2", ["healing", "daily"], Vec::<String>::new()),
        Item::new("P3", ["daily"], Vec::<String>::new()),
        Item::new("P4", Vec::<String>::new(), ["A"]),
    ]
}

fn create_test_server() -> TestServer {
    let state = AppState::in_memory(reference_catalog());
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn seed_reference_profile(server: &TestServer) {
    server
        .post("/sessions/s1/preferences/tags")
        .json(&json!({ "tag": "healing" }))
        .await
        .assert_status_ok();

    server
        .post("/sessions/s1/preferences/items")
        .json(&json!({ "id": "P1", "tags": ["daily"], "cast": ["A"] }))
        .await
        .assert_status_ok();
}

fn ranked_summary(body: &[Value]) -> Vec<(String, u64)> {
    body.iter()
        .map(|entry| {
            (
                entry["item"]["id"].as_str().unwrap().to_string(),
                entry["score"].as_u64().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_new_session_has_empty_profile() {
    let server = create_test_server();

    let response = server.get("/sessions/fresh/preferences").await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile, json!({ "favoriteTags": [], "favoriteItems": [] }));
}

#[tokio::test]
async fn test_reference_scenario_over_http() {
    let server = create_test_server();
    seed_reference_profile(&server).await;

    let response = server.get("/sessions/s1/recommendations").await;
    response.assert_status_ok();
    let body: Vec<Value> = response.json();

    assert_eq!(
        ranked_summary(&body),
        vec![
            ("P2".to_string(), 22),
            ("P4".to_string(), 3),
            ("P3".to_string(), 2)
        ]
    );
}

#[tokio::test]
async fn test_empty_profile_never_queries_catalog() {
    let catalog = Arc::new(MemoryCatalog::new(reference_catalog()));
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        catalog.clone(),
        EngineSettings::default(),
    );
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server.get("/sessions/s1/recommendations").await;
    response.assert_status_ok();
    let body: Vec<Value> = response.json();

    assert!(body.is_empty());
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_exclusions_and_limit() {
    let server = create_test_server();
    seed_reference_profile(&server).await;

    let response = server
        .get("/sessions/s1/recommendations")
        .add_query_param("current", "P2")
        .add_query_param("exclude", "P3")
        .await;
    let body: Vec<Value> = response.json();
    assert_eq!(ranked_summary(&body), vec![("P4".to_string(), 3)]);

    let response = server
        .get("/sessions/s1/recommendations")
        .add_query_param("limit", 1)
        .await;
    let body: Vec<Value> = response.json();
    assert_eq!(ranked_summary(&body), vec![("P2".to_string(), 22)]);
}

#[tokio::test]
async fn test_failing_terms_are_isolated() {
    let catalog = MemoryCatalog::new(reference_catalog())
        .with_unavailable_term("healing")
        .with_unavailable_term("A");
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(catalog),
        EngineSettings::default(),
    );
    let server = TestServer::new(create_router(state)).unwrap();
    seed_reference_profile(&server).await;

    let response = server.get("/sessions/s1/recommendations").await;
    response.assert_status_ok();
    let body: Vec<Value> = response.json();

    // Only the "daily" term answers
    assert_eq!(
        ranked_summary(&body),
        vec![("P2".to_string(), 22), ("P3".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_tag_and_item_mutations() {
    let server = create_test_server();
    seed_reference_profile(&server).await;

    // Adding the same tag twice is a no-op
    let response = server
        .post("/sessions/s1/preferences/tags")
        .json(&json!({ "tag": "healing" }))
        .await;
    let profile: Value = response.json();
    assert_eq!(profile["favoriteTags"], json!(["healing"]));

    let response = server.delete("/sessions/s1/preferences/items/P1").await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["favoriteItems"], json!([]));

    let response = server.delete("/sessions/s1/preferences/tags/healing").await;
    let profile: Value = response.json();
    assert_eq!(profile["favoriteTags"], json!([]));

    let response = server.get("/sessions/s1/preferences").await;
    let profile: Value = response.json();
    assert_eq!(profile, json!({ "favoriteTags": [], "favoriteItems": [] }));
}

#[tokio::test]
async fn test_clear_tags_keeps_items() {
    let server = create_test_server();
    seed_reference_profile(&server).await;

    let response = server.delete("/sessions/s1/preferences/tags").await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["favoriteTags"], json!([]));
    assert_eq!(profile["favoriteItems"].as_array().unwrap().len(), 1);

    let response = server.delete("/sessions/s1/preferences").await;
    let profile: Value = response.json();
    assert_eq!(profile, json!({ "favoriteTags": [], "favoriteItems": [] }));
}

#[tokio::test]
async fn test_blank_tag_is_rejected() {
    let server = create_test_server();

    let response = server
        .post("/sessions/s1/preferences/tags")
        .json(&json!({ "tag": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_latest_recommendations_follow_profile_changes() {
    let server = create_test_server();

    server
        .get("/sessions/s1/recommendations/latest")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    seed_reference_profile(&server).await;

    // The refresh runs in the background; wait for the newest generation
    let mut latest = Value::Null;
    for _ in 0..50 {
        let response = server.get("/sessions/s1/recommendations/latest").await;
        if response.status_code() == StatusCode::OK {
            latest = response.json();
            if latest["generation"] == json!(2) {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(latest["generation"], json!(2));
    let items = latest["items"].as_array().unwrap();
    assert_eq!(
        ranked_summary(items),
        vec![
            ("P2".to_string(), 22),
            ("P4".to_string(), 3),
            ("P3".to_string(), 2)
        ]
    );
}

async fn wait_for_generation(server: &TestServer, path: &str, generation: u64) -> Value {
    let mut latest = Value::Null;
    for _ in 0..50 {
        let response = server.get(path).await;
        if response.status_code() == StatusCode::OK {
            latest = response.json();
            if latest["generation"] == json!(generation) {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    latest
}

#[tokio::test]
async fn test_padded_favorite_id_is_excluded_everywhere() {
    let state = AppState::in_memory(vec![
        Item::new("P1", ["daily"], ["A"]),
        Item::new("P3", ["daily"], Vec::<String>::new()),
    ]);
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server
        .post("/sessions/s1/preferences/items")
        .json(&json!({ "id": " P1 ", "tags": ["daily"], "cast": ["A"] }))
        .await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["favoriteItems"][0]["id"], json!("P1"));

    let response = server.get("/sessions/s1/recommendations").await;
    let body: Vec<Value> = response.json();
    assert_eq!(ranked_summary(&body), vec![("P3".to_string(), 2)]);

    // The background refresh sees the same normalized profile
    let latest = wait_for_generation(&server, "/sessions/s1/recommendations/latest", 1).await;
    assert_eq!(latest["generation"], json!(1));
    let items = latest["items"].as_array().unwrap();
    assert_eq!(ranked_summary(items), vec![("P3".to_string(), 2)]);
}

#[tokio::test]
async fn test_favorite_item_duplicates_do_not_inflate_weights() {
    let server = create_test_server();

    let response = server
        .post("/sessions/s1/preferences/items")
        .json(&json!({ "id": "P1", "tags": ["daily", "daily", " daily "], "cast": ["A", "A"] }))
        .await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["favoriteItems"][0]["tags"], json!(["daily"]));
    assert_eq!(profile["favoriteItems"][0]["cast"], json!(["A"]));

    // daily and A each carry weight 1, so P3 scores 1 * 2 and P4 scores 1 * 3
    let response = server.get("/sessions/s1/recommendations").await;
    let body: Vec<Value> = response.json();
    assert_eq!(
        ranked_summary(&body),
        vec![
            ("P4".to_string(), 3),
            ("P2".to_string(), 2),
            ("P3".to_string(), 2)
        ]
    );
}

#[tokio::test]
async fn test_clearing_preferences_drops_latest_recommendations() {
    let server = create_test_server();
    seed_reference_profile(&server).await;

    let latest = wait_for_generation(&server, "/sessions/s1/recommendations/latest", 2).await;
    assert_eq!(latest["generation"], json!(2));

    server
        .delete("/sessions/s1/preferences")
        .await
        .assert_status_ok();

    server
        .get("/sessions/s1/recommendations/latest")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
