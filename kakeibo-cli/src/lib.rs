//! kakeibo-cli library - console front end for the recipe cost tracker
//!
//! Command parsing and execution live here so tests can run commands
//! against an in-memory store and inspect the rendered output.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use kakeibo_common::config::LoggingConfig;
use kakeibo_common::normalize::sort_by_reading;
use kakeibo_common::store::Backend;
use kakeibo_common::{compute_recipe_cost, Ingredient, LineItem, Recipe, Store, Upsert};

/// Console output is the product here; logs stay quiet unless configured
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Filter level for the console tool: `[logging] level`, else `warn`
pub fn log_level(logging: &LoggingConfig) -> &str {
    logging.level_or(DEFAULT_LOG_LEVEL)
}

/// Command-line arguments for kakeibo-cli
#[derive(Parser, Debug)]
#[command(name = "kakeibo-cli")]
#[command(about = "Register ingredients and recipes, and price recipes")]
#[command(version)]
pub struct Cli {
    /// Folder holding the database or JSON files
    #[arg(short, long, env = "KAKEIBO_ROOT_FOLDER", global = true)]
    pub root_folder: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(short, long, env = "KAKEIBO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend: sqlite, json or memory (overrides config file)
    #[arg(short, long, global = true)]
    pub backend: Option<Backend>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage ingredients
    #[command(subcommand)]
    Ingredient(IngredientCommand),

    /// Manage recipes
    #[command(subcommand)]
    Recipe(RecipeCommand),

    /// Show the cost breakdown of a recipe
    Cost { name: String },

    /// Show the kitchen measure reference
    Memo,
}

#[derive(Subcommand, Debug)]
pub enum IngredientCommand {
    /// Register or replace an ingredient
    Add(IngredientArgs),
    /// List ingredients in reading order
    List,
    /// Delete an ingredient (refused while a recipe uses it)
    Remove { name: String },
}

#[derive(Args, Debug)]
pub struct IngredientArgs {
    pub name: String,
    /// Price paid
    #[arg(long)]
    pub price: f64,
    /// Quantity bought for that price
    #[arg(long)]
    pub quantity: f64,
    /// Unit of the quantity (g, ml, piece, ...)
    #[arg(long)]
    pub unit: String,
}

#[derive(Subcommand, Debug)]
pub enum RecipeCommand {
    /// Register or replace a recipe
    Add(RecipeArgs),
    /// List recipes with their total cost
    List,
    /// Show a recipe's line items
    Show { name: String },
    /// Delete a recipe
    Remove { name: String },
}

#[derive(Args, Debug)]
pub struct RecipeArgs {
    pub name: String,
    /// Number of servings the recipe makes
    #[arg(long)]
    pub servings: u32,
    /// Line item as INGREDIENT=AMOUNT; repeat for each ingredient
    #[arg(long = "item", value_parser = parse_item)]
    pub items: Vec<(String, f64)>,
}

/// Parse `INGREDIENT=AMOUNT`; the last `=` splits so names may contain one
pub fn parse_item(raw: &str) -> std::result::Result<(String, f64), String> {
    let (name, amount) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected INGREDIENT=AMOUNT, got '{raw}'"))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| format!("amount must be a number, got '{}'", amount.trim()))?;
    Ok((name.trim().to_string(), amount))
}

fn saved(outcome: Upsert, kind: &str, name: &str) -> String {
    match outcome {
        Upsert::Created => format!("Registered {kind} '{name}'"),
        Upsert::Updated => format!("Updated {kind} '{name}'"),
    }
}

/// Run one command and return the text to print
pub async fn execute(command: Command, store: &dyn Store, memo: &str) -> Result<String> {
    match command {
        Command::Ingredient(cmd) => ingredient_command(cmd, store).await,
        Command::Recipe(cmd) => recipe_command(cmd, store).await,
        Command::Cost { name } => cost_report(&name, store).await,
        Command::Memo => Ok(memo.to_string()),
    }
}

async fn ingredient_command(cmd: IngredientCommand, store: &dyn Store) -> Result<String> {
    match cmd {
        IngredientCommand::Add(args) => {
            let ingredient = Ingredient::new(args.name, args.price, args.quantity, args.unit)?;
            let name = ingredient.name.clone();
            let outcome = store.upsert_ingredient(ingredient).await?;
            Ok(saved(outcome, "ingredient", &name))
        }
        IngredientCommand::List => {
            let mut ingredients = store.list_ingredients().await?;
            sort_by_reading(&mut ingredients, |i| i.name.as_str());
            let mut out = String::new();
            for i in &ingredients {
                writeln!(out, "{}: {} / {}{}", i.name, i.price, i.quantity, i.unit)?;
            }
            Ok(out.trim_end().to_string())
        }
        IngredientCommand::Remove { name } => {
            if store.delete_ingredient(&name).await? {
                Ok(format!("Deleted ingredient '{name}'"))
            } else {
                bail!("Ingredient '{name}' is not registered")
            }
        }
    }
}

async fn recipe_command(cmd: RecipeCommand, store: &dyn Store) -> Result<String> {
    match cmd {
        RecipeCommand::Add(args) => {
            let catalog = store.catalog().await?;
            let mut items = Vec::with_capacity(args.items.len());
            for (ingredient, amount) in args.items {
                if !catalog.contains(&ingredient) {
                    bail!("Ingredient '{ingredient}' is not registered");
                }
                items.push(LineItem::new(ingredient, amount)?);
            }
            let recipe = Recipe::new(args.name, args.servings, items)?;
            let name = recipe.name.clone();
            let outcome = store.upsert_recipe(recipe).await?;
            Ok(saved(outcome, "recipe", &name))
        }
        RecipeCommand::List => {
            let catalog = store.catalog().await?;
            let mut recipes = store.list_recipes().await?;
            sort_by_reading(&mut recipes, |r| r.name.as_str());
            let mut out = String::new();
            for recipe in &recipes {
                let summary = compute_recipe_cost(recipe, &catalog).summary();
                writeln!(
                    out,
                    "{} (total {} / {} serving(s))",
                    recipe.name, summary.total, recipe.servings
                )?;
            }
            Ok(out.trim_end().to_string())
        }
        RecipeCommand::Show { name } => {
            let recipe = store
                .get_recipe(&name)
                .await?
                .with_context(|| format!("Recipe '{name}' is not registered"))?;
            let catalog = store.catalog().await?;
            let mut out = format!("{} ({} serving(s))", recipe.name, recipe.servings);
            for item in &recipe.ingredients {
                let unit = catalog
                    .get(&item.ingredient)
                    .map(|i| i.unit.as_str())
                    .unwrap_or("?");
                write!(out, "\n  - {}: {}{}", item.ingredient, item.amount, unit)?;
            }
            Ok(out)
        }
        RecipeCommand::Remove { name } => {
            if store.delete_recipe(&name).await? {
                Ok(format!("Deleted recipe '{name}'"))
            } else {
                bail!("Recipe '{name}' is not registered")
            }
        }
    }
}

async fn cost_report(name: &str, store: &dyn Store) -> Result<String> {
    let recipe = store
        .get_recipe(name)
        .await?
        .with_context(|| format!("Recipe '{name}' is not registered"))?;
    let catalog = store.catalog().await?;
    let cost = compute_recipe_cost(&recipe, &catalog);

    let mut out = format!("--- {} ---", recipe.name);
    for line in &cost.lines {
        write!(out, "\n{}", line.describe())?;
    }

    let missing = cost.unregistered();
    if !missing.is_empty() {
        write!(out, "\n\nWarning: unregistered ingredients: {}", missing.join(", "))?;
    }

    let summary = cost.summary();
    write!(out, "\n\nTotal: {} ({:.2})", summary.total, cost.total)?;
    if recipe.servings > 0 {
        write!(
            out,
            "\nPer serving: {} ({:.2})",
            summary.per_serving, cost.per_serving
        )?;
    }
    Ok(out)
}
