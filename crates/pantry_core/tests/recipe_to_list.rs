//! Recipe → list conversion against the in-memory store.

mod support;

use pantry_core::conversion::add_recipe_to_list;
use pantry_core::items::{add_item, AddItem};
use pantry_core::{CoreError, IngredientSelection, IngredientSelections, PortError, RecipeToList};
use support::{article, d, ingredient, Kitchen, StaleReads};
use uuid::Uuid;

fn request(recipe_id: Uuid, servings: Option<u32>) -> RecipeToList {
    RecipeToList {
        recipe_id,
        servings,
        selections: IngredientSelections::new(),
    }
}

#[tokio::test]
async fn scales_quantities_and_snapshots_prices() {
    let kitchen = Kitchen::new().await;
    let flour = kitchen.stock(kitchen.flour, "Flour", Some("1.2")).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(
            Some(4),
            vec![ingredient(recipe_id, kitchen.flour, "Flour", "500.0", Some(flour.id))],
        )
        .await;

    let outcome = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &request(recipe.id, Some(2)))
        .await
        .expect("conversion succeeds");

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped, 0);
    let item = &outcome.items[0];
    assert_eq!(item.item.quantity, d("250"));
    assert_eq!(item.item.price, Some(d("1.2")));
    assert_eq!(item.item.added_by, kitchen.owner);
    assert_eq!(item.product_name, "Flour");
    assert_eq!(item.added_by_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn running_twice_skips_everything_the_second_time() {
    let kitchen = Kitchen::new().await;
    let flour = kitchen.stock(kitchen.flour, "Flour", Some("1.2")).await;
    let milk = kitchen.stock(kitchen.milk, "Milk", None).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(
            None,
            vec![
                ingredient(recipe_id, kitchen.flour, "Flour", "250.0", Some(flour.id)),
                ingredient(recipe_id, kitchen.milk, "Milk", "0.5", Some(milk.id)),
            ],
        )
        .await;
    let req = request(recipe.id, None);

    let first = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &req).await.unwrap();
    let second = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &req).await.unwrap();

    assert_eq!(first.added, 2);
    assert_eq!(second.added, 0);
    assert_eq!(second.skipped, 2);
    assert!(second.items.is_empty());
    assert_eq!(kitchen.db.items_on_list(kitchen.list_id).await.len(), 2);
}

#[tokio::test]
async fn article_already_on_the_list_is_skipped() {
    let kitchen = Kitchen::new().await;
    let eggs = kitchen.stock(kitchen.eggs, "Eggs", Some("0.3")).await;
    add_item(
        &kitchen.db,
        kitchen.owner,
        kitchen.list_id,
        &AddItem {
            article_id: eggs.id,
            quantity: d("6"),
            unit_id: None,
            store_id: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(None, vec![ingredient(recipe_id, kitchen.eggs, "Eggs", "3.0", None)])
        .await;
    let mut req = request(recipe.id, None);
    req.selections.insert(
        recipe.ingredients[0].id,
        IngredientSelection {
            article_id: eggs.id,
            quantity: None,
            unit_id: None,
        },
    );

    let outcome = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &req).await.unwrap();

    assert_eq!(outcome.added, 0);
    assert_eq!(outcome.skipped, 1);
    let items = kitchen.db.items_on_list(kitchen.list_id).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, d("6"));
}

#[tokio::test]
async fn ingredients_without_an_article_are_counted_not_added() {
    let kitchen = Kitchen::new().await;
    let flour = kitchen.stock(kitchen.flour, "Flour", None).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(
            None,
            vec![
                ingredient(recipe_id, kitchen.flour, "Flour", "250.0", Some(flour.id)),
                ingredient(recipe_id, kitchen.milk, "Milk", "0.5", None),
            ],
        )
        .await;

    let outcome = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &request(recipe.id, None))
        .await
        .unwrap();

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.unresolved, 1);
    assert!(outcome.message.contains("1 without a selected article"));
}

#[tokio::test]
async fn nothing_selectable_fails_without_touching_the_list() {
    let kitchen = Kitchen::new().await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(None, vec![ingredient(recipe_id, kitchen.milk, "Milk", "0.5", None)])
        .await;

    let err = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &request(recipe.id, None))
        .await
        .unwrap_err();

    match err {
        CoreError::Validation { message, .. } => assert_eq!(message, "no articles selected"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(kitchen.db.items_on_list(kitchen.list_id).await.is_empty());
}

#[tokio::test]
async fn article_of_another_product_fails_the_whole_conversion() {
    let kitchen = Kitchen::new().await;
    let flour = kitchen.stock(kitchen.flour, "Flour", None).await;
    let milk = kitchen.stock(kitchen.milk, "Milk", None).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(
            None,
            vec![
                ingredient(recipe_id, kitchen.flour, "Flour", "250.0", Some(flour.id)),
                ingredient(recipe_id, kitchen.eggs, "Eggs", "3.0", None),
            ],
        )
        .await;
    let mut req = request(recipe.id, None);
    req.selections.insert(
        recipe.ingredients[1].id,
        IngredientSelection {
            article_id: milk.id,
            quantity: None,
            unit_id: None,
        },
    );

    let err = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &req).await.unwrap_err();

    match err {
        CoreError::Validation { message, .. } => {
            assert_eq!(message, "Article 'Milk' does not belong to product 'Eggs'")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(kitchen.db.items_on_list(kitchen.list_id).await.is_empty());
}

#[tokio::test]
async fn private_article_of_another_user_is_forbidden_by_name() {
    let kitchen = Kitchen::new().await;
    let mut secret = article(kitchen.flour, "Flour", "Grandma's flour", None);
    secret.is_general = false;
    secret.owner_id = Some(Uuid::new_v4());
    kitchen.db.add_article(secret.clone()).await;

    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(None, vec![ingredient(recipe_id, kitchen.flour, "Flour", "250.0", Some(secret.id))])
        .await;

    let err = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &request(recipe.id, None))
        .await
        .unwrap_err();

    match err {
        CoreError::Forbidden(message) => assert!(message.contains("Grandma's flour")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_article_is_reported_with_the_product_name() {
    let kitchen = Kitchen::new().await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(None, vec![ingredient(recipe_id, kitchen.milk, "Milk", "1.0", Some(Uuid::new_v4()))])
        .await;

    let err = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &request(recipe.id, None))
        .await
        .unwrap_err();

    match err {
        CoreError::NotFound(message) => assert!(message.contains("'Milk'")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn selection_for_an_unknown_ingredient_is_rejected() {
    let kitchen = Kitchen::new().await;
    let flour = kitchen.stock(kitchen.flour, "Flour", None).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(None, vec![ingredient(recipe_id, kitchen.flour, "Flour", "250.0", Some(flour.id))])
        .await;
    let stray = Uuid::new_v4();
    let mut req = request(recipe.id, None);
    req.selections.insert(
        stray,
        IngredientSelection {
            article_id: flour.id,
            quantity: None,
            unit_id: None,
        },
    );

    let err = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &req).await.unwrap_err();

    match err {
        CoreError::Validation { field, .. } => assert_eq!(field, format!("ingredientSelections.{stray}")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn read_only_share_is_rejected_before_any_resolution() {
    let kitchen = Kitchen::new().await;

    // The recipe does not exist: the list check must fire first.
    let err = add_recipe_to_list(&kitchen.db, kitchen.stranger, kitchen.list_id, &request(Uuid::new_v4(), None))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[tokio::test]
async fn private_recipe_of_another_user_is_forbidden() {
    let kitchen = Kitchen::new().await;
    let flour = kitchen.stock(kitchen.flour, "Flour", None).await;
    let recipe_id = Uuid::new_v4();
    let mut recipe = kitchen
        .recipe(None, vec![ingredient(recipe_id, kitchen.flour, "Flour", "250.0", Some(flour.id))])
        .await;
    recipe.is_general = false;
    recipe.owner_id = Some(Uuid::new_v4());
    kitchen.db.add_recipe(recipe.clone()).await;

    let err = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &request(recipe.id, None))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[tokio::test]
async fn concurrent_insert_is_reported_as_skipped() {
    let kitchen = Kitchen::new().await;
    let flour = kitchen.stock(kitchen.flour, "Flour", None).await;
    let milk = kitchen.stock(kitchen.milk, "Milk", None).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(
            None,
            vec![
                ingredient(recipe_id, kitchen.flour, "Flour", "250.0", Some(flour.id)),
                ingredient(recipe_id, kitchen.milk, "Milk", "0.5", Some(milk.id)),
            ],
        )
        .await;
    let req = request(recipe.id, None);
    add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &req).await.unwrap();

    // The pre-check misses the existing rows; the uniqueness rule still holds.
    let outcome = add_recipe_to_list(&StaleReads(&kitchen.db), kitchen.owner, kitchen.list_id, &req)
        .await
        .unwrap();

    assert_eq!(outcome.added, 0);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(kitchen.db.items_on_list(kitchen.list_id).await.len(), 2);
}

#[tokio::test]
async fn two_ingredients_on_the_same_article_add_one_item() {
    let kitchen = Kitchen::new().await;
    let flour = kitchen.stock(kitchen.flour, "Flour", None).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(
            None,
            vec![
                ingredient(recipe_id, kitchen.flour, "Flour", "250.0", Some(flour.id)),
                ingredient(recipe_id, kitchen.flour, "Flour", "50.0", Some(flour.id)),
            ],
        )
        .await;

    let outcome = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &request(recipe.id, None))
        .await
        .unwrap();

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.items[0].item.quantity, d("250"));
}

#[tokio::test]
async fn quantity_override_is_scaled_with_the_recipe() {
    let kitchen = Kitchen::new().await;
    let milk = kitchen.stock(kitchen.milk, "Milk", None).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(Some(2), vec![ingredient(recipe_id, kitchen.milk, "Milk", "0.5", None)])
        .await;
    let unit = kitchen.unit("litre").await.id;
    let mut req = request(recipe.id, Some(6));
    req.selections.insert(
        recipe.ingredients[0].id,
        IngredientSelection {
            article_id: milk.id,
            quantity: Some(d("1")),
            unit_id: Some(unit),
        },
    );

    let outcome = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &req).await.unwrap();

    assert_eq!(outcome.items[0].item.quantity, d("3"));
    assert_eq!(outcome.items[0].item.unit_id, Some(unit));
}

#[tokio::test]
async fn zero_requested_servings_is_a_validation_error() {
    let kitchen = Kitchen::new().await;
    let flour = kitchen.stock(kitchen.flour, "Flour", None).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(Some(4), vec![ingredient(recipe_id, kitchen.flour, "Flour", "500.0", Some(flour.id))])
        .await;

    let err = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &request(recipe.id, Some(0)))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "servings"));
}


#[tokio::test]
async fn selection_with_an_unknown_unit_names_the_ingredient() {
    let kitchen = Kitchen::new().await;
    let milk = kitchen.stock(kitchen.milk, "Milk", None).await;
    let recipe_id = Uuid::new_v4();
    let recipe = kitchen
        .recipe(None, vec![ingredient(recipe_id, kitchen.milk, "Milk", "0.5", None)])
        .await;
    let ingredient_id = recipe.ingredients[0].id;
    let mut req = request(recipe.id, None);
    req.selections.insert(
        ingredient_id,
        IngredientSelection {
            article_id: milk.id,
            quantity: None,
            unit_id: Some(Uuid::new_v4()),
        },
    );

    let err = add_recipe_to_list(&kitchen.db, kitchen.owner, kitchen.list_id, &req).await.unwrap_err();

    match err {
        CoreError::Validation { field, .. } => {
            assert_eq!(field, format!("ingredientSelections.{ingredient_id}.unitId"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(kitchen.db.items_on_list(kitchen.list_id).await.is_empty());
}

fn add(article_id: Uuid, unit_id: Option<Uuid>, store_id: Option<Uuid>) -> AddItem {
    AddItem {
        article_id,
        quantity: d("1"),
        unit_id,
        store_id,
        notes: None,
    }
}

#[tokio::test]
async fn manual_add_with_an_unknown_unit_is_a_validation_error() {
    let kitchen = Kitchen::new().await;
    let eggs = kitchen.stock(kitchen.eggs, "Eggs", None).await;

    let err = add_item(&kitchen.db, kitchen.owner, kitchen.list_id, &add(eggs.id, Some(Uuid::new_v4()), None))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "unitId"));
    assert!(kitchen.db.items_on_list(kitchen.list_id).await.is_empty());
}

#[tokio::test]
async fn manual_add_with_an_unknown_store_is_a_validation_error() {
    let kitchen = Kitchen::new().await;
    let eggs = kitchen.stock(kitchen.eggs, "Eggs", None).await;

    let err = add_item(&kitchen.db, kitchen.owner, kitchen.list_id, &add(eggs.id, None, Some(Uuid::new_v4())))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "storeId"));
}

#[tokio::test]
async fn manual_add_at_a_private_store_of_another_user_is_forbidden() {
    let kitchen = Kitchen::new().await;
    let eggs = kitchen.stock(kitchen.eggs, "Eggs", None).await;
    let hidden = kitchen.store("Farm stand", Some(Uuid::new_v4())).await;

    let err = add_item(&kitchen.db, kitchen.owner, kitchen.list_id, &add(eggs.id, None, Some(hidden.id)))
        .await
        .unwrap_err();

    match err {
        CoreError::Forbidden(message) => assert!(message.contains("Farm stand")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn manual_add_keeps_known_unit_and_own_store() {
    let kitchen = Kitchen::new().await;
    let eggs = kitchen.stock(kitchen.eggs, "Eggs", None).await;
    let unit = kitchen.unit("piece").await;
    let own = kitchen.store("Pantry", Some(kitchen.owner)).await;

    let details = add_item(&kitchen.db, kitchen.owner, kitchen.list_id, &add(eggs.id, Some(unit.id), Some(own.id)))
        .await
        .unwrap();

    assert_eq!(details.item.unit_id, Some(unit.id));
    assert_eq!(details.item.store_id, Some(own.id));
    assert_eq!(details.store_name.as_deref(), Some("Pantry"));
}

#[tokio::test]
async fn store_rejects_items_pointing_at_missing_units() {
    let kitchen = Kitchen::new().await;
    let eggs = kitchen.stock(kitchen.eggs, "Eggs", None).await;
    let item = pantry_core::domain::NewItem {
        article_id: eggs.id,
        quantity: d("1"),
        unit_id: Some(Uuid::new_v4()),
        price: None,
        notes: None,
        added_by: kitchen.owner,
        store_id: None,
    };

    let err = pantry_core::DatabaseService::insert_items(&kitchen.db, kitchen.list_id, vec![item])
        .await
        .unwrap_err();

    assert!(matches!(err, PortError::Unexpected(_)));
    assert!(kitchen.db.items_on_list(kitchen.list_id).await.is_empty());
}
