//! crates/pantry_core/src/scaling.rs
//!
//! Serving-based quantity scaling. Purely numeric: units are never converted.

use rust_decimal::Decimal;

use crate::domain::ResolvedIngredient;
use crate::error::{CoreError, CoreResult};

/// `requested / base`, where a missing base means one serving and a missing
/// request means "as written".
pub fn serving_multiplier(requested: Option<u32>, base: Option<u32>) -> CoreResult<Decimal> {
    let base = base.unwrap_or(1);
    if base == 0 {
        return Err(CoreError::validation(
            "recipe.servings",
            "recipe servings must be greater than zero",
        ));
    }

    let requested = requested.unwrap_or(base);
    if requested == 0 {
        return Err(CoreError::validation(
            "servings",
            "servings must be greater than zero",
        ));
    }

    Ok(Decimal::from(requested) / Decimal::from(base))
}

pub fn scale_ingredients(ingredients: &mut [ResolvedIngredient], multiplier: Decimal) {
    for ingredient in ingredients.iter_mut() {
        ingredient.quantity = (ingredient.quantity * multiplier).normalize();
    }
}
