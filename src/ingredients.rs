//! Conversion between backend ingredient strings and structured ingredients.
//!
//! The backend stores each ingredient as one string ("2 eggs", "1/2 tsp salt").
//! Forms and tools work with an `{amount, name}` pair. Splitting is a best-effort
//! heuristic: a leading number or fraction, optionally followed by a single unit word,
//! is taken as the amount. `decode(encode(x))` is not guaranteed to return `x` when the
//! name itself starts with a digit.

use std::sync::LazyLock;

use regex::Regex;

use crate::client::types::{Ingredient, IngredientResponse};

// Leading number/fraction, one optional unit word, whitespace, then the rest.
// Digits and the unit word are ASCII only, so "2 crème fraîche" keeps its name whole.
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9/.]+(?:\s+[A-Za-z0-9_]+)?)\s+(.+)$")
        .expect("Invalid ingredient amount regex")
});

/// Render an ingredient as the single string the backend expects.
///
/// `{amount: "2", name: "eggs"}` becomes `"2 eggs"`; a blank amount yields the name alone.
pub fn encode(ingredient: &Ingredient) -> String {
    let name = ingredient.name.trim();
    let amount = ingredient.amount.trim();
    if amount.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", amount, name)
    }
}

/// Split a backend ingredient string into amount and name.
///
/// Strings without a leading quantity ("salt to taste") are kept whole as the name.
pub fn decode(raw: &str, id: Option<i64>) -> Ingredient {
    let trimmed = raw.trim();

    match AMOUNT_PATTERN.captures(trimmed) {
        Some(caps) => Ingredient {
            id,
            amount: caps[1].trim().to_string(),
            name: caps[2].trim().to_string(),
        },
        None => Ingredient {
            id,
            amount: String::new(),
            name: trimmed.to_string(),
        },
    }
}

/// Encode ingredients for submission, skipping rows whose name is blank.
pub fn encode_all(ingredients: &[Ingredient]) -> Vec<String> {
    ingredients
        .iter()
        .filter(|ing| !ing.name.trim().is_empty())
        .map(encode)
        .collect()
}

pub fn decode_all(ingredients: &[IngredientResponse]) -> Vec<Ingredient> {
    ingredients
        .iter()
        .map(|ing| decode(&ing.ingredient_name, Some(ing.id)))
        .collect()
}
