//! Persistence for ingredients and recipes
//!
//! One `Store` trait, three interchangeable backends:
//! - [`SqliteStore`]: relational tables via sqlx
//! - [`JsonFileStore`]: `ingredients.json` / `recipes.json`, rewritten on every mutation
//! - [`MemoryStore`]: process-local maps, used by tests and `--backend memory`
//!
//! The composition root (web server, CLI) owns exactly one store and hands
//! it to the cost and sorting code by reference. Core logic never does I/O.

use crate::cost::{compute_recipe_cost, RecipeCost};
use crate::model::{Catalog, Ingredient, Recipe};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod json_file;
mod memory;
mod sqlite;
mod state;

pub use json_file::{JsonFileStore, INGREDIENTS_FILE, RECIPES_FILE};
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, DATABASE_FILE};

/// Outcome of an upsert keyed by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Upsert {
    Created,
    Updated,
}

/// Storage capability required by the cost tracker
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend label for logs and the health endpoint
    fn backend_name(&self) -> &'static str;

    async fn get_ingredient(&self, name: &str) -> Result<Option<Ingredient>>;

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>>;

    async fn get_recipe(&self, name: &str) -> Result<Option<Recipe>>;

    async fn list_recipes(&self) -> Result<Vec<Recipe>>;

    async fn upsert_ingredient(&self, ingredient: Ingredient) -> Result<Upsert>;

    /// Create or replace a recipe, including all of its line items
    async fn upsert_recipe(&self, recipe: Recipe) -> Result<Upsert>;

    /// Remove an ingredient.
    ///
    /// Returns `Ok(false)` when no such ingredient exists. Fails with
    /// `Error::Conflict` (and changes nothing) while any recipe uses it.
    async fn delete_ingredient(&self, name: &str) -> Result<bool>;

    /// Remove a recipe and its line items. `Ok(false)` when absent.
    async fn delete_recipe(&self, name: &str) -> Result<bool>;

    /// Snapshot of all ingredients indexed by name
    async fn catalog(&self) -> Result<Catalog> {
        Ok(self.list_ingredients().await?.into_iter().collect())
    }

    /// Cost of the named recipe, `None` if the recipe does not exist
    async fn recipe_cost(&self, name: &str) -> Result<Option<RecipeCost>> {
        let Some(recipe) = self.get_recipe(name).await? else {
            return Ok(None);
        };
        let catalog = self.catalog().await?;
        Ok(Some(compute_recipe_cost(&recipe, &catalog)))
    }
}

/// Which backend the composition root should build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Json,
    Memory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Sqlite => "sqlite",
            Backend::Json => "json",
            Backend::Memory => "memory",
        };
        f.write_str(name)
    }
}

impl FromStr for Backend {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sql" => Ok(Backend::Sqlite),
            "json" => Ok(Backend::Json),
            "memory" => Ok(Backend::Memory),
            other => Err(crate::Error::Config(format!("Unknown storage backend: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse_and_display() {
        assert_eq!("SQLite".parse::<Backend>().unwrap(), Backend::Sqlite);
        assert_eq!("json".parse::<Backend>().unwrap(), Backend::Json);
        assert_eq!(Backend::Memory.to_string(), "memory");
        assert!("postgres".parse::<Backend>().is_err());
    }
}
