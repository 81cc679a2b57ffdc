//! HTTP API handlers for kakeibo-web

use axum::http::StatusCode;
use kakeibo_common::Upsert;

pub mod health;
pub mod ingredients;
pub mod overview;
pub mod recipes;

pub use health::health_routes;
pub use ingredients::ingredient_routes;
pub use overview::overview_routes;
pub use recipes::recipe_routes;

/// 201 for a new record, 200 for a replaced one
pub(crate) fn upsert_status(outcome: Upsert) -> StatusCode {
    match outcome {
        Upsert::Created => StatusCode::CREATED,
        Upsert::Updated => StatusCode::OK,
    }
}
