//! crates/pantry_core/src/conversion.rs
//!
//! Recipe → shopping list: resolve, scale, then materialize.

use tracing::info;
use uuid::Uuid;

use crate::access::{accessible, editable_list};
use crate::domain::{RecipeToList, RecipeToListOutcome, UserId};
use crate::error::{CoreError, CoreResult};
use crate::materializer::materialize;
use crate::ports::DatabaseService;
use crate::resolver::resolve_ingredients;
use crate::scaling::{scale_ingredients, serving_multiplier};

pub async fn add_recipe_to_list(
    db: &dyn DatabaseService,
    user_id: UserId,
    list_id: Uuid,
    request: &RecipeToList,
) -> CoreResult<RecipeToListOutcome> {
    let list = editable_list(db, user_id, list_id).await?;

    let recipe = db.get_recipe(request.recipe_id).await?;
    if !accessible(&recipe, user_id) {
        return Err(CoreError::Forbidden(
            "You do not have access to this recipe".to_string(),
        ));
    }

    let multiplier = serving_multiplier(request.servings, recipe.servings)?;
    let mut resolution = resolve_ingredients(db, user_id, &recipe, &request.selections).await?;
    scale_ingredients(&mut resolution.resolved, multiplier);

    let materialized = materialize(db, list.id, &resolution.resolved, user_id).await?;
    let added = materialized.added();
    let skipped = materialized.skipped;

    info!(
        %list_id,
        recipe_id = %recipe.id,
        added,
        skipped,
        unresolved = resolution.unresolved,
        %multiplier,
        "Recipe added to shopping list"
    );

    Ok(RecipeToListOutcome {
        message: outcome_message(&recipe.name, added, skipped, resolution.unresolved),
        added,
        skipped,
        unresolved: resolution.unresolved,
        items: materialized.items,
    })
}

fn outcome_message(recipe_name: &str, added: usize, skipped: usize, unresolved: usize) -> String {
    let mut message = format!(
        "Added {} item{} from recipe '{}'",
        added,
        if added == 1 { "" } else { "s" },
        recipe_name
    );
    if skipped > 0 {
        message.push_str(&format!(", {skipped} already on the list"));
    }
    if unresolved > 0 {
        message.push_str(&format!(", {unresolved} without a selected article"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::outcome_message;

    #[test]
    fn message_mentions_only_non_zero_counts() {
        assert_eq!(outcome_message("Crêpes", 3, 0, 0), "Added 3 items from recipe 'Crêpes'");
        assert_eq!(
            outcome_message("Crêpes", 1, 2, 1),
            "Added 1 item from recipe 'Crêpes', 2 already on the list, 1 without a selected article"
        );
    }
}
