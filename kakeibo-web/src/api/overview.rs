//! Overview endpoints: everything the front page shows in one response

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::ingredients::{sorted_ingredients, IngredientView};
use super::recipes::{recipe_summaries, RecipeSummaryView};
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub ingredients: Vec<IngredientView>,
    pub recipes: Vec<RecipeSummaryView>,
    pub memo: String,
}

#[derive(Debug, Serialize)]
pub struct MemoResponse {
    pub memo: String,
}

/// GET /api/overview
///
/// Ingredients and recipes both ordered by reading; recipe costs rounded
/// to whole currency units.
pub async fn get_overview(State(state): State<AppState>) -> ApiResult<Json<OverviewResponse>> {
    Ok(Json(OverviewResponse {
        ingredients: sorted_ingredients(&state).await?,
        recipes: recipe_summaries(&state).await?,
        memo: state.memo.to_string(),
    }))
}

/// GET /api/memo
pub async fn get_memo(State(state): State<AppState>) -> Json<MemoResponse> {
    Json(MemoResponse {
        memo: state.memo.to_string(),
    })
}

pub fn overview_routes() -> Router<AppState> {
    Router::new()
        .route("/api/overview", get(get_overview))
        .route("/api/memo", get(get_memo))
}
