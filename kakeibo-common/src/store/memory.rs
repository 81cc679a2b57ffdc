//! In-memory store

use super::state::CatalogState;
use super::{Store, Upsert};
use crate::model::{Ingredient, Recipe};
use crate::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// Store that keeps everything in process memory; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<CatalogState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_ingredient(&self, name: &str) -> Result<Option<Ingredient>> {
        Ok(self.state.read().await.ingredients.get(name).cloned())
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        Ok(self.state.read().await.ingredients.values().cloned().collect())
    }

    async fn get_recipe(&self, name: &str) -> Result<Option<Recipe>> {
        Ok(self.state.read().await.recipes.get(name).cloned())
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        Ok(self.state.read().await.recipes.values().cloned().collect())
    }

    async fn upsert_ingredient(&self, ingredient: Ingredient) -> Result<Upsert> {
        ingredient.validate()?;
        let name = ingredient.name.clone();
        let outcome = self.state.write().await.upsert_ingredient(ingredient);
        info!(ingredient = %name, ?outcome, "Saved ingredient");
        Ok(outcome)
    }

    async fn upsert_recipe(&self, recipe: Recipe) -> Result<Upsert> {
        recipe.validate()?;
        let name = recipe.name.clone();
        let outcome = self.state.write().await.upsert_recipe(recipe);
        info!(recipe = %name, ?outcome, "Saved recipe");
        Ok(outcome)
    }

    async fn delete_ingredient(&self, name: &str) -> Result<bool> {
        self.state.write().await.delete_ingredient(name)
    }

    async fn delete_recipe(&self, name: &str) -> Result<bool> {
        Ok(self.state.write().await.delete_recipe(name))
    }
}
