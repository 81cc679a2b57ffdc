//! kakeibo-web library - HTTP API for the recipe cost tracker
//!
//! Exposes the router and state so integration tests can drive the API
//! without binding a socket.

use axum::Router;
use kakeibo_common::Store;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Ingredient/recipe store chosen at startup
    pub store: Arc<dyn Store>,
    /// Kitchen measure reference shown with the overview
    pub memo: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, memo: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            memo: memo.into(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::overview_routes())
        .merge(api::ingredient_routes())
        .merge(api::recipe_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
