//! Integration tests for kakeibo-web API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Ingredient CRUD, validation and blocked deletes
//! - Recipe CRUD and cost breakdown
//! - Overview ordering by reading

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use kakeibo_common::store::{MemoryStore, SqliteStore};
use kakeibo_common::{LineItem, Recipe, Store};
use kakeibo_web::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a fresh in-memory store
fn setup_app() -> (axum::Router, Arc<dyn Store>) {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let app = build_router(AppState::new(store.clone(), "test memo"));
    (app, store)
}

/// Test helper: app over an in-memory SQLite database
async fn setup_sqlite_app() -> (axum::Router, Arc<dyn Store>) {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().await.unwrap());
    let app = build_router(AppState::new(store.clone(), "test memo"));
    (app, store)
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Register the stir-fry ingredients and recipe through the API
async fn seed_stir_fry(app: &axum::Router) {
    for body in [
        json!({"name": "Cabbage", "price": 200, "quantity": 1, "unit": "piece"}),
        json!({"name": "Onion", "price": 100, "quantity": 1, "unit": "piece"}),
        json!({"name": "Soy Sauce", "price": 300, "quantity": 500, "unit": "ml"}),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/ingredients", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({
                "name": "Stir-fry",
                "servings": 2,
                "ingredients": [
                    {"ingredient": "Cabbage", "amount": 1},
                    {"ingredient": "Onion", "amount": 2},
                    {"ingredient": "Soy Sauce", "amount": 15}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _store) = setup_app();

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "kakeibo-web");
    assert_eq!(body["backend"], "memory");
    assert!(body["version"].is_string());
    assert!(!body["build"]["git_hash"].as_str().unwrap().is_empty());
    assert!(body["build"]["timestamp"].as_str().unwrap().ends_with('Z'));
    assert!(["debug", "release"].contains(&body["build"]["profile"].as_str().unwrap()));
}

// =============================================================================
// Ingredients
// =============================================================================

#[tokio::test]
async fn test_create_then_update_ingredient() {
    let (app, _store) = setup_app();

    let body = json!({"name": "Egg", "price": 250, "quantity": 10, "unit": "piece"});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/ingredients", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = extract_json(response.into_body()).await;
    assert_eq!(created["price_per_unit"], 25.0);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/ingredients/Egg",
            json!({"price": 300, "quantity": 10, "unit": "piece"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("GET", "/api/ingredients/Egg"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["price"], 300.0);
}

#[tokio::test]
async fn test_update_unknown_ingredient_is_404() {
    let (app, _store) = setup_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/ingredients/Nothing",
            json!({"price": 1, "quantity": 1, "unit": "g"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_price_is_400() {
    let (app, store) = setup_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/ingredients",
            json!({"name": "Egg", "price": "cheap", "quantity": 10, "unit": "piece"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(store.list_ingredients().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_zero_quantity_is_400() {
    let (app, _store) = setup_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/ingredients",
            json!({"name": "Rice", "price": 2000, "quantity": 0, "unit": "kg"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_ingredient_in_use_is_409() {
    let (app, store) = setup_sqlite_app().await;
    seed_stir_fry(&app).await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/api/ingredients/Onion"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Stir-fry"));
    assert!(store.get_ingredient("Onion").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_unused_ingredient() {
    let (app, store) = setup_app();
    seed_stir_fry(&app).await;
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/ingredients",
            json!({"name": "Garlic", "price": 98, "quantity": 3, "unit": "clove"}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/api/ingredients/Garlic"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.get_ingredient("Garlic").await.unwrap().is_none());

    let response = app
        .oneshot(empty_request("DELETE", "/api/ingredients/Garlic"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Recipes and cost
// =============================================================================

#[tokio::test]
async fn test_recipe_cost_breakdown() {
    let (app, _store) = setup_sqlite_app().await;
    seed_stir_fry(&app).await;

    let response = app
        .oneshot(empty_request("GET", "/api/recipes/Stir-fry/cost"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 409);
    assert_eq!(body["per_serving"], 205);
    assert_eq!(body["per_serving_raw"], 204.5);
    assert_eq!(body["lines"].as_array().unwrap().len(), 3);
    assert_eq!(body["lines"][0]["status"], "priced");
    assert_eq!(body["lines"][2]["line_cost_display"], 9.0);
    assert_eq!(body["lines"][2]["display"], "Soy Sauce: 15ml × 0.60 = 9.00");
    assert!(body["unregistered"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cost_with_dangling_line() {
    let (app, store) = setup_app();
    seed_stir_fry(&app).await;

    // Bypass API validation to simulate an ingredient that disappeared
    let spicy = Recipe::new(
        "Spicy",
        1,
        vec![
            LineItem::new("Ghost Pepper", 1.0).unwrap(),
            LineItem::new("Cabbage", 1.0).unwrap(),
        ],
    )
    .unwrap();
    store.upsert_recipe(spicy).await.unwrap();

    let response = app
        .oneshot(empty_request("GET", "/api/recipes/Spicy/cost"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 200);
    assert_eq!(body["lines"][0]["status"], "unregistered");
    assert_eq!(body["lines"][0]["display"], "Ghost Pepper: unregistered");
    assert_eq!(body["unregistered"], json!(["Ghost Pepper"]));
}

#[tokio::test]
async fn test_cost_of_unknown_recipe_is_404() {
    let (app, _store) = setup_app();

    let response = app
        .oneshot(empty_request("GET", "/api/recipes/Nope/cost"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recipe_missing_servings_is_400() {
    let (app, _store) = setup_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({"name": "Toast", "ingredients": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recipe_with_unregistered_ingredient_is_400() {
    let (app, store) = setup_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({
                "name": "Toast",
                "servings": 1,
                "ingredients": [{"ingredient": "Bread", "amount": 1}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("Bread"));
    assert!(store.list_recipes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_and_delete_recipe() {
    let (app, store) = setup_app();
    seed_stir_fry(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/recipes/Stir-fry",
            json!({"servings": 0, "ingredients": [{"ingredient": "Cabbage", "amount": 1}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cost = store.recipe_cost("Stir-fry").await.unwrap().unwrap();
    assert_eq!(cost.per_serving, 0.0);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/api/recipes/Stir-fry"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/api/recipes/Stir-fry"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Overview
// =============================================================================

#[tokio::test]
async fn test_overview_sorted_by_reading() {
    let (app, _store) = setup_app();

    for body in [
        json!({"name": "りんご", "price": 150, "quantity": 1, "unit": "個"}),
        json!({"name": "アイス", "price": 120, "quantity": 1, "unit": "個"}),
        json!({"name": "いちご", "price": 400, "quantity": 12, "unit": "粒"}),
    ] {
        app.clone()
            .oneshot(json_request("POST", "/api/ingredients", body))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(empty_request("GET", "/api/overview"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let names: Vec<&str> = body["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["アイス", "いちご", "りんご"]);
    assert_eq!(body["memo"], "test memo");
}

#[tokio::test]
async fn test_recipe_list_has_rounded_costs() {
    let (app, _store) = setup_app();
    seed_stir_fry(&app).await;

    let response = app
        .oneshot(empty_request("GET", "/api/recipes"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["recipes"][0]["name"], "Stir-fry");
    assert_eq!(body["recipes"][0]["total"], 409);
    assert_eq!(body["recipes"][0]["per_serving"], 205);
}

#[tokio::test]
async fn test_posting_existing_recipe_replaces_it() {
    let (app, store) = setup_sqlite_app().await;
    seed_stir_fry(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recipes",
            json!({
                "name": "Stir-fry",
                "servings": 4,
                "ingredients": [{"ingredient": "Cabbage", "amount": 2}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let recipe = store.get_recipe("Stir-fry").await.unwrap().unwrap();
    assert_eq!(recipe.servings, 4);
    assert_eq!(recipe.ingredients.len(), 1);
}
