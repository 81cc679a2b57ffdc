//! Map-backed state shared by the in-memory and JSON-file stores

use super::Upsert;
use crate::model::{Ingredient, Recipe};
use crate::{Error, Result};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub(crate) struct CatalogState {
    pub(crate) ingredients: BTreeMap<String, Ingredient>,
    pub(crate) recipes: BTreeMap<String, Recipe>,
}

impl CatalogState {
    pub(crate) fn upsert_ingredient(&mut self, ingredient: Ingredient) -> Upsert {
        match self.ingredients.insert(ingredient.name.clone(), ingredient) {
            Some(_) => Upsert::Updated,
            None => Upsert::Created,
        }
    }

    pub(crate) fn upsert_recipe(&mut self, recipe: Recipe) -> Upsert {
        match self.recipes.insert(recipe.name.clone(), recipe) {
            Some(_) => Upsert::Updated,
            None => Upsert::Created,
        }
    }

    /// Recipes that use `ingredient`, in name order
    pub(crate) fn recipes_using(&self, ingredient: &str) -> Vec<String> {
        self.recipes
            .values()
            .filter(|recipe| recipe.uses(ingredient))
            .map(|recipe| recipe.name.clone())
            .collect()
    }

    pub(crate) fn delete_ingredient(&mut self, name: &str) -> Result<bool> {
        let recipes = self.recipes_using(name);
        if !recipes.is_empty() {
            warn!(ingredient = name, ?recipes, "Refusing to delete ingredient in use");
            return Err(Error::Conflict {
                ingredient: name.to_string(),
                recipes,
            });
        }
        Ok(self.ingredients.remove(name).is_some())
    }

    pub(crate) fn delete_recipe(&mut self, name: &str) -> bool {
        self.recipes.remove(name).is_some()
    }
}
