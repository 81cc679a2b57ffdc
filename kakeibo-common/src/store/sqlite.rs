//! SQLite store
//!
//! Schema:
//! - `ingredients(id, name UNIQUE, price, quantity, unit, ...)`
//! - `recipes(id, name UNIQUE, servings, ...)`
//! - `recipe_ingredients(recipe_id, position, ingredient_name, amount)`
//!
//! Line items reference ingredients by name without a foreign key, so a
//! line can outlive its ingredient (e.g. rows edited by hand). The cost
//! aggregator reports such lines as unregistered.
//!
//! Every mutation runs in one transaction whose first statement is a
//! write, so the transaction holds the write lock from the start and never
//! has to upgrade a read snapshot.

use super::{Store, Upsert};
use crate::model::{Ingredient, LineItem, Recipe};
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Default database file name inside the root folder
pub const DATABASE_FILE: &str = "kakeibo.db";

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Store backed by a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database at `db_path`, creating file, parent folder and
    /// tables as needed.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Options apply to every pooled connection, not just the first
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(BUSY_TIMEOUT)
            .connect_with(options)
            .await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        Self::init(pool).await
    }

    /// Private in-memory database, mainly for tests.
    ///
    /// Pinned to a single connection that never expires: each SQLite
    /// `:memory:` connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;
        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> Result<Self> {
        create_ingredients_table(&pool).await?;
        create_recipes_table(&pool).await?;
        create_recipe_ingredients_table(&pool).await?;

        Ok(Self { pool })
    }

    async fn load_line_items(&self, recipe_id: i64) -> Result<Vec<LineItem>> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            "SELECT ingredient_name, amount FROM recipe_ingredients WHERE recipe_id = ? ORDER BY position",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(ingredient, amount)| LineItem { ingredient, amount })
            .collect())
    }
}

pub async fn create_ingredients_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            price REAL NOT NULL CHECK (price > 0),
            quantity REAL NOT NULL CHECK (quantity > 0),
            unit TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_recipes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            servings INTEGER NOT NULL CHECK (servings >= 0),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_recipe_ingredients_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recipe_ingredients (
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            ingredient_name TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            PRIMARY KEY (recipe_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_name ON recipe_ingredients(ingredient_name)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn servings_from_db(name: &str, servings: i64) -> Result<u32> {
    u32::try_from(servings)
        .map_err(|_| Error::Internal(format!("Recipe '{}' has invalid servings {}", name, servings)))
}

#[async_trait]
impl Store for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn get_ingredient(&self, name: &str) -> Result<Option<Ingredient>> {
        let row: Option<(String, f64, f64, String)> =
            sqlx::query_as("SELECT name, price, quantity, unit FROM ingredients WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(name, price, quantity, unit)| Ingredient {
            name,
            price,
            quantity,
            unit,
        }))
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        let rows: Vec<(String, f64, f64, String)> =
            sqlx::query_as("SELECT name, price, quantity, unit FROM ingredients ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(name, price, quantity, unit)| Ingredient {
                name,
                price,
                quantity,
                unit,
            })
            .collect())
    }

    async fn get_recipe(&self, name: &str) -> Result<Option<Recipe>> {
        let row: Option<(i64, String, i64)> =
            sqlx::query_as("SELECT id, name, servings FROM recipes WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        let Some((id, name, servings)) = row else {
            return Ok(None);
        };

        Ok(Some(Recipe {
            servings: servings_from_db(&name, servings)?,
            ingredients: self.load_line_items(id).await?,
            name,
        }))
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let recipes: Vec<(i64, String, i64)> =
            sqlx::query_as("SELECT id, name, servings FROM recipes ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        let lines: Vec<(i64, String, f64)> = sqlx::query_as(
            "SELECT recipe_id, ingredient_name, amount FROM recipe_ingredients ORDER BY recipe_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_recipe: HashMap<i64, Vec<LineItem>> = HashMap::new();
        for (recipe_id, ingredient, amount) in lines {
            by_recipe
                .entry(recipe_id)
                .or_default()
                .push(LineItem { ingredient, amount });
        }

        recipes
            .into_iter()
            .map(|(id, name, servings)| {
                Ok(Recipe {
                    servings: servings_from_db(&name, servings)?,
                    ingredients: by_recipe.remove(&id).unwrap_or_default(),
                    name,
                })
            })
            .collect()
    }

    async fn upsert_ingredient(&self, ingredient: Ingredient) -> Result<Upsert> {
        ingredient.validate()?;
        let mut tx = self.pool.begin().await?;

        let insert = sqlx::query(
            r#"
            INSERT INTO ingredients (name, price, quantity, unit)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(&ingredient.name)
        .bind(ingredient.price)
        .bind(ingredient.quantity)
        .bind(&ingredient.unit)
        .execute(&mut *tx)
        .await?;

        let outcome = if insert.rows_affected() > 0 {
            Upsert::Created
        } else {
            sqlx::query(
                r#"
                UPDATE ingredients
                SET price = ?, quantity = ?, unit = ?, updated_at = CURRENT_TIMESTAMP
                WHERE name = ?
                "#,
            )
            .bind(ingredient.price)
            .bind(ingredient.quantity)
            .bind(&ingredient.unit)
            .bind(&ingredient.name)
            .execute(&mut *tx)
            .await?;
            Upsert::Updated
        };

        tx.commit().await?;
        info!(ingredient = %ingredient.name, ?outcome, "Saved ingredient");
        Ok(outcome)
    }

    async fn upsert_recipe(&self, recipe: Recipe) -> Result<Upsert> {
        recipe.validate()?;
        let mut tx = self.pool.begin().await?;

        let insert = sqlx::query(
            "INSERT INTO recipes (name, servings) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(&recipe.name)
        .bind(i64::from(recipe.servings))
        .execute(&mut *tx)
        .await?;

        let (recipe_id, outcome) = if insert.rows_affected() > 0 {
            (insert.last_insert_rowid(), Upsert::Created)
        } else {
            let id: i64 = sqlx::query_scalar(
                r#"
                UPDATE recipes
                SET servings = ?, updated_at = CURRENT_TIMESTAMP
                WHERE name = ?
                RETURNING id
                "#,
            )
            .bind(i64::from(recipe.servings))
            .bind(&recipe.name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            (id, Upsert::Updated)
        };

        for (position, item) in recipe.ingredients.iter().enumerate() {
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, position, ingredient_name, amount) VALUES (?, ?, ?, ?)",
            )
            .bind(recipe_id)
            .bind(position as i64)
            .bind(&item.ingredient)
            .bind(item.amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            recipe = %recipe.name,
            lines = recipe.ingredients.len(),
            ?outcome,
            "Saved recipe"
        );
        Ok(outcome)
    }

    async fn delete_ingredient(&self, name: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM ingredients WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        let recipes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT r.name
            FROM recipe_ingredients ri
            JOIN recipes r ON r.id = ri.recipe_id
            WHERE ri.ingredient_name = ?
            ORDER BY r.name
            "#,
        )
        .bind(name)
        .fetch_all(&mut *tx)
        .await?;

        if !recipes.is_empty() {
            warn!(ingredient = name, ?recipes, "Refusing to delete ingredient in use");
            tx.rollback().await?;
            return Err(Error::Conflict {
                ingredient: name.to_string(),
                recipes,
            });
        }

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(ingredient = name, "Deleted ingredient");
        }
        Ok(deleted)
    }

    async fn delete_recipe(&self, name: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Line items first; does not depend on ON DELETE CASCADE
        sqlx::query(
            "DELETE FROM recipe_ingredients WHERE recipe_id IN (SELECT id FROM recipes WHERE name = ?)",
        )
        .bind(name)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM recipes WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(recipe = name, "Deleted recipe");
        }
        Ok(deleted)
    }
}
