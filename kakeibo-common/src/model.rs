//! Ingredient and recipe models
//!
//! Records are keyed by name. Constructors trim and validate input so that
//! every stored ingredient has a positive purchase quantity (the divisor in
//! `price_per_unit`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A purchasable item: `price` paid for `quantity` units of `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
}

impl Ingredient {
    /// Create a validated ingredient
    ///
    /// **Errors:** `InvalidInput` when the name or unit is blank, or when
    /// price/quantity are not finite positive numbers.
    pub fn new(
        name: impl Into<String>,
        price: f64,
        quantity: f64,
        unit: impl Into<String>,
    ) -> Result<Self> {
        let ingredient = Self {
            name: name.into().trim().to_string(),
            price,
            quantity,
            unit: unit.into().trim().to_string(),
        };
        ingredient.validate()?;
        Ok(ingredient)
    }

    /// Re-check invariants on a record that was deserialized directly
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid("ingredient name must not be empty"));
        }
        if self.unit.is_empty() {
            return Err(Error::invalid(format!(
                "unit for ingredient '{}' must not be empty",
                self.name
            )));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(Error::invalid(format!(
                "price for ingredient '{}' must be a positive number",
                self.name
            )));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(Error::invalid(format!(
                "quantity for ingredient '{}' must be a positive number",
                self.name
            )));
        }
        Ok(())
    }

    /// Cost of one unit of this ingredient
    pub fn price_per_unit(&self) -> f64 {
        self.price / self.quantity
    }
}

/// One (ingredient, amount) pair of a recipe. `amount` is in the
/// ingredient's own unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub ingredient: String,
    pub amount: f64,
}

impl LineItem {
    pub fn new(ingredient: impl Into<String>, amount: f64) -> Result<Self> {
        let item = Self {
            ingredient: ingredient.into().trim().to_string(),
            amount,
        };
        item.validate()?;
        Ok(item)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ingredient.is_empty() {
            return Err(Error::invalid("line item ingredient must not be empty"));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::invalid(format!(
                "amount of '{}' must be a non-negative number",
                self.ingredient
            )));
        }
        Ok(())
    }
}

/// A named dish with a serving count and ordered line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub servings: u32,
    pub ingredients: Vec<LineItem>,
}

impl Recipe {
    pub fn new(name: impl Into<String>, servings: u32, ingredients: Vec<LineItem>) -> Result<Self> {
        let recipe = Self {
            name: name.into().trim().to_string(),
            servings,
            ingredients,
        };
        recipe.validate()?;
        Ok(recipe)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid("recipe name must not be empty"));
        }
        self.ingredients.iter().try_for_each(LineItem::validate)
    }

    /// Whether any line item refers to `ingredient`
    pub fn uses(&self, ingredient: &str) -> bool {
        self.ingredients.iter().any(|item| item.ingredient == ingredient)
    }
}

/// Name-indexed snapshot of the ingredient list.
///
/// Lookups never fail: an unknown name is simply `None`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    ingredients: HashMap<String, Ingredient>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Ingredient> {
        self.ingredients.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ingredients.contains_key(name)
    }

    /// Insert or replace an ingredient, returning the previous record
    pub fn insert(&mut self, ingredient: Ingredient) -> Option<Ingredient> {
        self.ingredients.insert(ingredient.name.clone(), ingredient)
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

impl FromIterator<Ingredient> for Catalog {
    fn from_iter<I: IntoIterator<Item = Ingredient>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for ingredient in iter {
            catalog.insert(ingredient);
        }
        catalog
    }
}
