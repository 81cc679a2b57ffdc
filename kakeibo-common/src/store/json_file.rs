//! JSON-file store
//!
//! Keeps two files in a data folder:
//!
//! ```text
//! ingredients.json  { "Cabbage": { "price": 200.0, "quantity": 1.0, "unit": "piece" } }
//! recipes.json      { "Stir-fry": { "ingredients": [["Cabbage", 1.0]], "servings": 2 } }
//! ```
//!
//! Older recipe files stored a bare list of `[name, amount]` pairs per
//! recipe; those load with one serving.
//!
//! Both files are loaded once on open. Each successful mutation rewrites the
//! affected file (temp file + rename) while the write lock is held, so the
//! on-disk state always matches memory.

use super::state::CatalogState;
use super::{Store, Upsert};
use crate::model::{Ingredient, LineItem, Recipe};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const INGREDIENTS_FILE: &str = "ingredients.json";
pub const RECIPES_FILE: &str = "recipes.json";

#[derive(Debug, Serialize, Deserialize)]
struct IngredientRecord {
    price: f64,
    quantity: f64,
    unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeRecord {
    Current {
        ingredients: Vec<(String, f64)>,
        #[serde(default = "default_servings")]
        servings: u32,
    },
    Legacy(Vec<(String, f64)>),
}

#[derive(Debug, Serialize)]
struct RecipeRecordOut<'a> {
    ingredients: Vec<(&'a str, f64)>,
    servings: u32,
}

fn default_servings() -> u32 {
    1
}

/// Store persisted as a pair of JSON documents
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    state: RwLock<CatalogState>,
}

impl JsonFileStore {
    /// Open (or start) a store in `dir`. Missing files mean an empty store.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let mut state = CatalogState::default();
        for (name, value) in read_records(&dir.join(INGREDIENTS_FILE)).await? {
            let ingredient = serde_json::from_value::<IngredientRecord>(value)
                .map_err(crate::Error::from)
                .and_then(|r| Ingredient::new(name.clone(), r.price, r.quantity, r.unit));
            match ingredient {
                Ok(ingredient) => {
                    state.upsert_ingredient(ingredient);
                }
                Err(e) => warn!(ingredient = %name, "Skipping invalid ingredient record: {}", e),
            }
        }

        for (name, value) in read_records(&dir.join(RECIPES_FILE)).await? {
            let recipe = serde_json::from_value::<RecipeRecord>(value)
                .map_err(crate::Error::from)
                .and_then(|r| recipe_from_record(&name, r));
            match recipe {
                Ok(recipe) => {
                    state.upsert_recipe(recipe);
                }
                Err(e) => warn!(recipe = %name, "Skipping invalid recipe record: {}", e),
            }
        }

        info!(
            "Loaded {} ingredient(s) and {} recipe(s) from {}",
            state.ingredients.len(),
            state.recipes.len(),
            dir.display()
        );

        Ok(Self {
            dir,
            state: RwLock::new(state),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    async fn save_ingredients(&self, state: &CatalogState) -> Result<()> {
        let records: BTreeMap<&str, IngredientRecord> = state
            .ingredients
            .values()
            .map(|i| {
                (
                    i.name.as_str(),
                    IngredientRecord {
                        price: i.price,
                        quantity: i.quantity,
                        unit: i.unit.clone(),
                    },
                )
            })
            .collect();
        write_json(&self.dir.join(INGREDIENTS_FILE), &records).await
    }

    async fn save_recipes(&self, state: &CatalogState) -> Result<()> {
        let records: BTreeMap<&str, RecipeRecordOut<'_>> = state
            .recipes
            .values()
            .map(|r| {
                (
                    r.name.as_str(),
                    RecipeRecordOut {
                        ingredients: r
                            .ingredients
                            .iter()
                            .map(|item| (item.ingredient.as_str(), item.amount))
                            .collect(),
                        servings: r.servings,
                    },
                )
            })
            .collect();
        write_json(&self.dir.join(RECIPES_FILE), &records).await
    }
}

fn recipe_from_record(name: &str, record: RecipeRecord) -> Result<Recipe> {
    let (pairs, servings) = match record {
        RecipeRecord::Current {
            ingredients,
            servings,
        } => (ingredients, servings),
        RecipeRecord::Legacy(pairs) => (pairs, default_servings()),
    };
    let items = pairs
        .into_iter()
        .map(|(ingredient, amount)| LineItem::new(ingredient, amount))
        .collect::<Result<Vec<_>>>()?;
    Recipe::new(name, servings, items)
}

/// Read a name-keyed JSON object. Records are decoded one by one by the
/// caller so a bad record does not take the whole file down.
async fn read_records(path: &Path) -> Result<BTreeMap<String, serde_json::Value>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not found, starting empty", path.display());
            Ok(BTreeMap::new())
        }
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl Store for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "json"
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
        let mut state = self.state.write().await;
        let previous = state.ingredients.get(&name).cloned();
        let outcome = state.upsert_ingredient(ingredient);
        if let Err(e) = self.save_ingredients(&state).await {
            // Roll memory back so it keeps matching the file
            match previous {
                Some(old) => {
                    state.upsert_ingredient(old);
                }
                None => {
                    state.ingredients.remove(&name);
                }
            }
            return Err(e);
        }
        info!(ingredient = %name, ?outcome, "Saved ingredient");
        Ok(outcome)
    }

    async fn upsert_recipe(&self, recipe: Recipe) -> Result<Upsert> {
        recipe.validate()?;
        let name = recipe.name.clone();
        let mut state = self.state.write().await;
        let previous = state.recipes.get(&name).cloned();
        let outcome = state.upsert_recipe(recipe);
        if let Err(e) = self.save_recipes(&state).await {
            match previous {
                Some(old) => {
                    state.upsert_recipe(old);
                }
                None => {
                    state.recipes.remove(&name);
                }
            }
            return Err(e);
        }
        info!(recipe = %name, ?outcome, "Saved recipe");
        Ok(outcome)
    }

    async fn delete_ingredient(&self, name: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let previous = state.ingredients.get(name).cloned();
        if !state.delete_ingredient(name)? {
            return Ok(false);
        }
        if let Err(e) = self.save_ingredients(&state).await {
            if let Some(old) = previous {
                state.upsert_ingredient(old);
            }
            return Err(e);
        }
        info!(ingredient = name, "Deleted ingredient");
        Ok(true)
    }

    async fn delete_recipe(&self, name: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let Some(previous) = state.recipes.get(name).cloned() else {
            return Ok(false);
        };
        state.delete_recipe(name);
        if let Err(e) = self.save_recipes(&state).await {
            state.upsert_recipe(previous);
            return Err(e);
        }
        info!(recipe = name, "Deleted recipe");
        Ok(true)
    }
}
