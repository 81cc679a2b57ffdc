//! Ingredient endpoints
//!
//! - `GET    /api/ingredients`        list, ordered by reading
//! - `POST   /api/ingredients`        create or replace by name
//! - `GET    /api/ingredients/:name`
//! - `PUT    /api/ingredients/:name`  update an existing ingredient
//! - `DELETE /api/ingredients/:name`  409 while a recipe uses it

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use kakeibo_common::normalize::sort_by_reading;
use kakeibo_common::Ingredient;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::upsert_status;
use crate::{ApiError, ApiResult, AppState};

/// Body of `POST /api/ingredients`
#[derive(Debug, Deserialize)]
pub struct IngredientPayload {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
}

/// Body of `PUT /api/ingredients/:name`
#[derive(Debug, Deserialize)]
pub struct IngredientUpdate {
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Serialize)]
pub struct IngredientView {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
    pub price_per_unit: f64,
}

impl From<Ingredient> for IngredientView {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            price_per_unit: ingredient.price_per_unit(),
            name: ingredient.name,
            price: ingredient.price,
            quantity: ingredient.quantity,
            unit: ingredient.unit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientListResponse {
    pub ingredients: Vec<IngredientView>,
}

/// All ingredients ordered by reading
pub(crate) async fn sorted_ingredients(state: &AppState) -> ApiResult<Vec<IngredientView>> {
    let mut ingredients = state.store.list_ingredients().await?;
    sort_by_reading(&mut ingredients, |i| i.name.as_str());
    Ok(ingredients.into_iter().map(IngredientView::from).collect())
}

/// GET /api/ingredients
pub async fn list_ingredients(
    State(state): State<AppState>,
) -> ApiResult<Json<IngredientListResponse>> {
    Ok(Json(IngredientListResponse {
        ingredients: sorted_ingredients(&state).await?,
    }))
}

/// GET /api/ingredients/:name
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<IngredientView>> {
    let ingredient = state
        .store
        .get_ingredient(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Ingredient '{}'", name)))?;
    Ok(Json(ingredient.into()))
}

/// POST /api/ingredients
///
/// **Response:** 201 when created, 200 when an existing ingredient of the
/// same name was replaced.
///
/// **Errors:**
/// - 400 Bad Request: malformed body, blank name/unit, non-positive price or quantity
pub async fn create_ingredient(
    State(state): State<AppState>,
    payload: Result<Json<IngredientPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IngredientView>)> {
    let Json(payload) = payload?;
    let ingredient = Ingredient::new(payload.name, payload.price, payload.quantity, payload.unit)?;

    let outcome = state.store.upsert_ingredient(ingredient.clone()).await?;
    Ok((upsert_status(outcome), Json(ingredient.into())))
}

/// PUT /api/ingredients/:name
pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<IngredientUpdate>, JsonRejection>,
) -> ApiResult<Json<IngredientView>> {
    let Json(payload) = payload?;
    if state.store.get_ingredient(&name).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Ingredient '{}' is not registered",
            name
        )));
    }

    let ingredient = Ingredient::new(name, payload.price, payload.quantity, payload.unit)?;
    state.store.upsert_ingredient(ingredient.clone()).await?;
    Ok(Json(ingredient.into()))
}

/// DELETE /api/ingredients/:name
///
/// **Errors:**
/// - 404 Not Found: no such ingredient
/// - 409 Conflict: one or more recipes still use the ingredient; nothing is deleted
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    if state.store.delete_ingredient(&name).await? {
        info!("Ingredient '{}' deleted via API", name);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Ingredient '{}'", name)))
    }
}

/// Build ingredient routes
pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ingredients", get(list_ingredients).post(create_ingredient))
        .route(
            "/api/ingredients/:name",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
}
