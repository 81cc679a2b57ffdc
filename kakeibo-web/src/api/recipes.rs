//! Recipe and cost endpoints
//!
//! - `GET    /api/recipes`             list with rounded costs, ordered by reading
//! - `POST   /api/recipes`             create or replace by name
//! - `GET    /api/recipes/:name`
//! - `PUT    /api/recipes/:name`       replace servings and line items of an existing recipe
//! - `DELETE /api/recipes/:name`
//! - `GET    /api/recipes/:name/cost`  full cost breakdown

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use kakeibo_common::cost::round_cents;
use kakeibo_common::normalize::sort_by_reading;
use kakeibo_common::{compute_recipe_cost, Catalog, LineDetail, LineItem, Recipe};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::upsert_status;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct LineItemPayload {
    pub ingredient: String,
    pub amount: f64,
}

/// Body of `POST /api/recipes`. `servings` is required.
#[derive(Debug, Deserialize)]
pub struct RecipePayload {
    pub name: String,
    pub servings: u32,
    #[serde(default)]
    pub ingredients: Vec<LineItemPayload>,
}

/// Body of `PUT /api/recipes/:name`
#[derive(Debug, Deserialize)]
pub struct RecipeUpdate {
    pub servings: u32,
    #[serde(default)]
    pub ingredients: Vec<LineItemPayload>,
}

/// Recipe row for list views
#[derive(Debug, Serialize)]
pub struct RecipeSummaryView {
    pub name: String,
    pub servings: u32,
    pub total: i64,
    pub per_serving: i64,
}

#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeSummaryView>,
}

#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub name: String,
    pub servings: u32,
    pub ingredients: Vec<LineItem>,
}

impl From<Recipe> for RecipeView {
    fn from(recipe: Recipe) -> Self {
        Self {
            name: recipe.name,
            servings: recipe.servings,
            ingredients: recipe.ingredients,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineView {
    #[serde(flatten)]
    pub detail: LineDetail,
    pub line_cost_display: f64,
    pub display: String,
}

/// Response of `GET /api/recipes/:name/cost`
///
/// `total`/`per_serving` are rounded to whole currency units; the `_raw`
/// fields keep full precision.
#[derive(Debug, Serialize)]
pub struct CostResponse {
    pub recipe: String,
    pub servings: u32,
    pub total: i64,
    pub per_serving: i64,
    pub total_raw: f64,
    pub per_serving_raw: f64,
    pub lines: Vec<LineView>,
    pub unregistered: Vec<String>,
}

/// All recipes with rounded costs, ordered by reading
pub(crate) async fn recipe_summaries(state: &AppState) -> ApiResult<Vec<RecipeSummaryView>> {
    let catalog = state.store.catalog().await?;
    let mut recipes = state.store.list_recipes().await?;
    sort_by_reading(&mut recipes, |r| r.name.as_str());

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let summary = compute_recipe_cost(&recipe, &catalog).summary();
            RecipeSummaryView {
                name: recipe.name,
                servings: recipe.servings,
                total: summary.total,
                per_serving: summary.per_serving,
            }
        })
        .collect())
}

/// Validate line items and check every ingredient is registered
fn build_recipe(
    name: String,
    servings: u32,
    items: Vec<LineItemPayload>,
    catalog: &Catalog,
) -> ApiResult<Recipe> {
    let items = items
        .into_iter()
        .map(|item| LineItem::new(item.ingredient, item.amount))
        .collect::<kakeibo_common::Result<Vec<_>>>()?;

    let unknown: Vec<&str> = items
        .iter()
        .filter(|item| !catalog.contains(&item.ingredient))
        .map(|item| item.ingredient.as_str())
        .collect();
    if !unknown.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Unregistered ingredient(s): {}",
            unknown.join(", ")
        )));
    }

    Ok(Recipe::new(name, servings, items)?)
}

/// GET /api/recipes
pub async fn list_recipes(State(state): State<AppState>) -> ApiResult<Json<RecipeListResponse>> {
    Ok(Json(RecipeListResponse {
        recipes: recipe_summaries(&state).await?,
    }))
}

/// GET /api/recipes/:name
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<RecipeView>> {
    let recipe = state
        .store
        .get_recipe(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recipe '{}'", name)))?;
    Ok(Json(recipe.into()))
}

/// POST /api/recipes
///
/// **Errors:**
/// - 400 Bad Request: malformed body, missing servings, negative amounts,
///   or a line naming an ingredient that is not registered
pub async fn create_recipe(
    State(state): State<AppState>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    let Json(payload) = payload?;
    let catalog = state.store.catalog().await?;
    let recipe = build_recipe(payload.name, payload.servings, payload.ingredients, &catalog)?;

    let outcome = state.store.upsert_recipe(recipe.clone()).await?;
    Ok((upsert_status(outcome), Json(recipe.into())))
}

/// PUT /api/recipes/:name
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<RecipeUpdate>, JsonRejection>,
) -> ApiResult<Json<RecipeView>> {
    let Json(payload) = payload?;
    if state.store.get_recipe(&name).await?.is_none() {
        return Err(ApiError::NotFound(format!("Recipe '{}' is not registered", name)));
    }

    let catalog = state.store.catalog().await?;
    let recipe = build_recipe(name, payload.servings, payload.ingredients, &catalog)?;
    state.store.upsert_recipe(recipe.clone()).await?;
    Ok(Json(recipe.into()))
}

/// DELETE /api/recipes/:name
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    if state.store.delete_recipe(&name).await? {
        info!("Recipe '{}' deleted via API", name);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Recipe '{}'", name)))
    }
}

/// GET /api/recipes/:name/cost
///
/// Lines whose ingredient has since disappeared are reported with status
/// `unregistered` and listed in `unregistered`; they do not fail the request.
pub async fn get_recipe_cost(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<CostResponse>> {
    let recipe = state
        .store
        .get_recipe(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recipe '{}'", name)))?;
    let catalog = state.store.catalog().await?;
    let cost = compute_recipe_cost(&recipe, &catalog);

    let summary = cost.summary();
    let unregistered = cost.unregistered().into_iter().map(str::to_string).collect();
    let lines = cost
        .lines
        .iter()
        .map(|line| LineView {
            display: line.describe(),
            line_cost_display: round_cents(line.line_cost()),
            detail: line.clone(),
        })
        .collect();

    Ok(Json(CostResponse {
        recipe: recipe.name,
        servings: recipe.servings,
        total: summary.total,
        per_serving: summary.per_serving,
        total_raw: cost.total,
        per_serving_raw: cost.per_serving,
        lines,
        unregistered,
    }))
}

/// Build recipe routes
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/:name",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/api/recipes/:name/cost", get(get_recipe_cost))
}
