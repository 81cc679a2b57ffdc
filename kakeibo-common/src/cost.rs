//! Recipe cost aggregation
//!
//! Sums `price / quantity * amount` over a recipe's line items. Lines whose
//! ingredient is missing from the catalog degrade to `Unregistered` and add
//! nothing; the rest of the recipe is still priced.
//!
//! Accumulation keeps full `f64` precision. Rounding only happens at the
//! presentation boundary (`RecipeCost::summary`, `LineDetail::describe`).

use crate::model::{Catalog, Recipe};
use serde::Serialize;

/// Cost breakdown for one recipe line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineDetail {
    Priced {
        name: String,
        amount: f64,
        unit: String,
        unit_price: f64,
        line_cost: f64,
    },
    /// Ingredient not (or no longer) in the catalog
    Unregistered { name: String, amount: f64 },
}

impl LineDetail {
    pub fn name(&self) -> &str {
        match self {
            LineDetail::Priced { name, .. } | LineDetail::Unregistered { name, .. } => name,
        }
    }

    /// Contribution to the recipe total (0 for unregistered lines)
    pub fn line_cost(&self) -> f64 {
        match self {
            LineDetail::Priced { line_cost, .. } => *line_cost,
            LineDetail::Unregistered { .. } => 0.0,
        }
    }

    pub fn is_unregistered(&self) -> bool {
        matches!(self, LineDetail::Unregistered { .. })
    }

    /// Human-readable line with two fractional digits,
    /// e.g. `Soy Sauce: 15ml × 0.60 = 9.00`.
    pub fn describe(&self) -> String {
        match self {
            LineDetail::Priced {
                name,
                amount,
                unit,
                unit_price,
                line_cost,
            } => format!("{name}: {amount}{unit} × {unit_price:.2} = {line_cost:.2}"),
            LineDetail::Unregistered { name, .. } => format!("{name}: unregistered"),
        }
    }
}

/// Rounded figures for list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CostSummary {
    pub total: i64,
    pub per_serving: i64,
}

/// Full-precision cost of a recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeCost {
    pub total: f64,
    pub per_serving: f64,
    pub lines: Vec<LineDetail>,
}

impl RecipeCost {
    /// Totals rounded to whole currency units (half away from zero)
    pub fn summary(&self) -> CostSummary {
        CostSummary {
            total: self.total.round() as i64,
            per_serving: self.per_serving.round() as i64,
        }
    }

    /// Names of line items whose ingredient is not registered
    pub fn unregistered(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|line| line.is_unregistered())
            .map(LineDetail::name)
            .collect()
    }
}

/// Compute total and per-serving cost of `recipe` against `catalog`.
///
/// `per_serving` is 0 when the recipe has no servings.
pub fn compute_recipe_cost(recipe: &Recipe, catalog: &Catalog) -> RecipeCost {
    let lines: Vec<LineDetail> = recipe
        .ingredients
        .iter()
        .map(|item| match catalog.get(&item.ingredient) {
            Some(ingredient) => {
                let unit_price = ingredient.price_per_unit();
                LineDetail::Priced {
                    name: ingredient.name.clone(),
                    amount: item.amount,
                    unit: ingredient.unit.clone(),
                    unit_price,
                    line_cost: unit_price * item.amount,
                }
            }
            None => LineDetail::Unregistered {
                name: item.ingredient.clone(),
                amount: item.amount,
            },
        })
        .collect();

    let total: f64 = lines.iter().map(LineDetail::line_cost).sum();
    let per_serving = if recipe.servings > 0 {
        total / f64::from(recipe.servings)
    } else {
        0.0
    };

    RecipeCost {
        total,
        per_serving,
        lines,
    }
}

/// Round to two fractional digits for display fields
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
