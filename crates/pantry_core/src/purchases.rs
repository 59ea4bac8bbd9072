//! crates/pantry_core/src/purchases.rs
//!
//! Purchase lifecycle: checkout of the checked items of a list, after-the-fact
//! reconciliation of quantities and prices, and read projections.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::access::{editable_list, viewable_list};
use crate::domain::{Purchase, PurchaseEdit, RecordPurchase, UserId};
use crate::error::CoreResult;
use crate::ledger::{build_purchase, validate_edit};
use crate::ports::DatabaseService;

/// Freezes every checked item of the list into a new purchase.
pub async fn record_purchase(
    db: &dyn DatabaseService,
    user_id: UserId,
    list_id: Uuid,
    request: &RecordPurchase,
) -> CoreResult<Purchase> {
    let list = editable_list(db, user_id, list_id).await?;
    let checked = db.get_checked_items(list.id).await?;
    let draft = build_purchase(list.id, &checked, request, Utc::now())?;

    let purchase = db.create_purchase(draft).await?;
    info!(
        %list_id,
        purchase_id = %purchase.id,
        lines = purchase.items.len(),
        total_paid = ?purchase.total_paid,
        "Purchase recorded"
    );
    Ok(purchase)
}

/// Applies quantity, price and note corrections to a recorded purchase.
pub async fn reconcile_purchase(
    db: &dyn DatabaseService,
    user_id: UserId,
    purchase_id: Uuid,
    edit: &PurchaseEdit,
) -> CoreResult<Purchase> {
    let current = db.get_purchase(purchase_id).await?;
    editable_list(db, user_id, current.shopping_list_id).await?;
    validate_edit(&current, edit)?;

    let purchase = db.reconcile_purchase(purchase_id, edit).await?;
    info!(
        %purchase_id,
        edits = edit.items.len(),
        total_paid = ?purchase.total_paid,
        "Purchase reconciled"
    );
    Ok(purchase)
}

pub async fn get_purchase(
    db: &dyn DatabaseService,
    user_id: UserId,
    purchase_id: Uuid,
) -> CoreResult<Purchase> {
    let purchase = db.get_purchase(purchase_id).await?;
    viewable_list(db, user_id, purchase.shopping_list_id).await?;
    Ok(purchase)
}

pub async fn list_purchases(
    db: &dyn DatabaseService,
    user_id: UserId,
    list_id: Uuid,
) -> CoreResult<Vec<Purchase>> {
    let list = viewable_list(db, user_id, list_id).await?;
    Ok(db.get_purchases_for_list(list.id).await?)
}
