//! # Kakeibo Common Library
//!
//! Shared code for the kakeibo recipe cost tracker:
//! - Ingredient and recipe models with input validation
//! - Reading keys for syllabary-ordered display lists
//! - Recipe cost aggregation
//! - `Store` abstraction with SQLite, JSON-file and in-memory backends
//! - Bootstrap configuration loading

pub mod config;
pub mod cost;
pub mod error;
pub mod memo;
pub mod model;
pub mod normalize;
pub mod store;

pub use cost::{compute_recipe_cost, CostSummary, LineDetail, RecipeCost};
pub use error::{Error, Result};
pub use model::{Catalog, Ingredient, LineItem, Recipe};
pub use store::{Store, Upsert};
