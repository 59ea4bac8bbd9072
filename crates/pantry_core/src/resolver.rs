//! crates/pantry_core/src/resolver.rs
//!
//! Maps each recipe ingredient (an abstract product) to a concrete article,
//! taken from the caller's selection or from the recipe's stored default.

use rust_decimal::Decimal;
use tracing::debug;

use crate::access::accessible;
use crate::catalog::known_unit;
use crate::domain::{IngredientSelections, Recipe, ResolvedIngredient, UserId};
use crate::error::{CoreError, CoreResult};
use crate::ports::{DatabaseService, PortError};

#[derive(Debug, Clone)]
pub struct Resolution {
    /// Resolved ingredients, in recipe order.
    pub resolved: Vec<ResolvedIngredient>,
    /// Ingredients that had neither a selection nor a default article.
    pub unresolved: usize,
}

/// Rejects selections keyed by ids that are not ingredients of `recipe`, and
/// quantity overrides that are not strictly positive.
pub fn validate_selections(recipe: &Recipe, selections: &IngredientSelections) -> CoreResult<()> {
    for (ingredient_id, selection) in selections {
        let field = format!("ingredientSelections.{ingredient_id}");
        if !recipe.ingredients.iter().any(|i| i.id == *ingredient_id) {
            return Err(CoreError::validation(
                field,
                "not an ingredient of this recipe",
            ));
        }
        if let Some(quantity) = selection.quantity {
            if quantity <= Decimal::ZERO {
                return Err(CoreError::validation(
                    format!("{field}.quantity"),
                    "quantity must be greater than zero",
                ));
            }
        }
    }
    Ok(())
}

pub async fn resolve_ingredients(
    db: &dyn DatabaseService,
    user_id: UserId,
    recipe: &Recipe,
    selections: &IngredientSelections,
) -> CoreResult<Resolution> {
    validate_selections(recipe, selections)?;

    let mut resolved = Vec::with_capacity(recipe.ingredients.len());
    let mut unresolved = 0;

    for ingredient in &recipe.ingredients {
        let selection = selections.get(&ingredient.id);
        let Some(article_id) = selection
            .map(|s| s.article_id)
            .or(ingredient.default_article_id)
        else {
            debug!(ingredient_id = %ingredient.id, "No article for ingredient, excluding it");
            unresolved += 1;
            continue;
        };

        let article = db.get_article(article_id).await.map_err(|e| match e {
            PortError::NotFound(_) => CoreError::NotFound(format!(
                "Article selected for '{}' was not found",
                ingredient.product_name
            )),
            other => CoreError::from(other),
        })?;

        if !accessible(&article, user_id) {
            return Err(CoreError::Forbidden(format!(
                "You do not have access to article '{}'",
                article.display_name()
            )));
        }

        if article.product_id != ingredient.product_id {
            return Err(CoreError::validation(
                format!("ingredientSelections.{}.articleId", ingredient.id),
                format!(
                    "Article '{}' does not belong to product '{}'",
                    article.display_name(),
                    ingredient.product_name
                ),
            ));
        }

        if let Some(unit_id) = selection.and_then(|s| s.unit_id) {
            known_unit(
                db,
                unit_id,
                format!("ingredientSelections.{}.unitId", ingredient.id),
            )
            .await?;
        }

        resolved.push(ResolvedIngredient {
            ingredient_id: ingredient.id,
            quantity: selection
                .and_then(|s| s.quantity)
                .unwrap_or(ingredient.quantity),
            unit_id: selection.and_then(|s| s.unit_id).or(ingredient.unit_id),
            notes: ingredient.notes.clone(),
            article,
        });
    }

    if resolved.is_empty() {
        return Err(CoreError::validation(
            "ingredientSelections",
            "no articles selected",
        ));
    }

    Ok(Resolution {
        resolved,
        unresolved,
    })
}
