//! crates/pantry_core/src/items.rs
//!
//! Manual list operations that take part in quantity math: adding a single
//! article to a list and checking an item off.

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::access::{accessible, editable_list};
use crate::catalog::{known_unit, usable_store};
use crate::domain::{ItemCheckUpdate, ItemDetails, NewItem, UserId};
use crate::error::{CoreError, CoreResult};
use crate::ports::DatabaseService;

#[derive(Debug, Clone)]
pub struct AddItem {
    pub article_id: Uuid,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub notes: Option<String>,
}

pub async fn add_item(
    db: &dyn DatabaseService,
    user_id: UserId,
    list_id: Uuid,
    request: &AddItem,
) -> CoreResult<ItemDetails> {
    if request.quantity <= Decimal::ZERO {
        return Err(CoreError::validation(
            "quantity",
            "quantity must be greater than zero",
        ));
    }

    let list = editable_list(db, user_id, list_id).await?;
    let article = db.get_article(request.article_id).await?;
    if !accessible(&article, user_id) {
        return Err(CoreError::Forbidden(format!(
            "You do not have access to article '{}'",
            article.display_name()
        )));
    }

    if let Some(unit_id) = request.unit_id {
        known_unit(db, unit_id, "unitId").await?;
    }
    if let Some(store_id) = request.store_id {
        usable_store(db, user_id, store_id, "storeId").await?;
    }

    let new_item = NewItem {
        article_id: article.id,
        quantity: request.quantity,
        unit_id: request.unit_id,
        price: article.suggested_price,
        notes: request.notes.clone(),
        added_by: user_id,
        store_id: request.store_id.or(article.default_store_id),
    };

    // The (list, article) unique index decides; an empty result means it was taken.
    let created = db.insert_items(list.id, vec![new_item]).await?;
    let Some(details) = created.into_iter().next() else {
        return Err(CoreError::Conflict(format!(
            "Article '{}' is already on this list",
            article.display_name()
        )));
    };

    info!(%list_id, item_id = %details.item.id, "Item added to list");
    Ok(details)
}

pub async fn check_item(
    db: &dyn DatabaseService,
    user_id: UserId,
    list_id: Uuid,
    item_id: Uuid,
    update: &ItemCheckUpdate,
) -> CoreResult<ItemDetails> {
    let list = editable_list(db, user_id, list_id).await?;
    let item = db.get_item(item_id).await?;
    if item.shopping_list_id != list.id {
        return Err(CoreError::NotFound(format!(
            "Item {item_id} is not on this list"
        )));
    }

    if let Some(purchased) = update.purchased_quantity {
        if purchased < Decimal::ZERO {
            return Err(CoreError::validation(
                "purchasedQuantity",
                "purchased quantity must not be negative",
            ));
        }
        if purchased > item.quantity {
            return Err(CoreError::validation(
                "purchasedQuantity",
                format!(
                    "purchased quantity cannot exceed the requested quantity ({})",
                    item.quantity
                ),
            ));
        }
    }
    if let Some(price) = update.price {
        if price < Decimal::ZERO {
            return Err(CoreError::validation("price", "price must not be negative"));
        }
    }

    Ok(db.update_item_check(item.id, update).await?)
}
