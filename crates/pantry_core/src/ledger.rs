//! crates/pantry_core/src/ledger.rs
//!
//! The one place where purchase subtotals and totals are computed. Both the
//! recorder and the reconciler go through these functions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    Item, NewPurchase, NewPurchaseItem, Purchase, PurchaseEdit, PurchaseItem, RecordPurchase,
};
use crate::error::{CoreError, CoreResult};

/// A priced purchase line.
pub trait LedgerLine {
    fn price(&self) -> Option<Decimal>;
    fn subtotal(&self) -> Decimal;
}

impl LedgerLine for PurchaseItem {
    fn price(&self) -> Option<Decimal> {
        self.price
    }

    fn subtotal(&self) -> Decimal {
        self.subtotal
    }
}

impl LedgerLine for NewPurchaseItem {
    fn price(&self) -> Option<Decimal> {
        self.price
    }

    fn subtotal(&self) -> Decimal {
        self.subtotal
    }
}

/// `purchased_quantity * price`, an unpriced line being worth zero.
pub fn subtotal(purchased_quantity: Decimal, price: Option<Decimal>) -> Decimal {
    purchased_quantity * price.unwrap_or(Decimal::ZERO)
}

/// Sum of the subtotals of lines priced above zero. `None` when that sum is
/// zero, so "nothing was priced yet" stays distinguishable from a real amount.
pub fn total_paid<'a, L, I>(lines: I) -> Option<Decimal>
where
    L: LedgerLine + 'a,
    I: IntoIterator<Item = &'a L>,
{
    let total: Decimal = lines
        .into_iter()
        .filter(|line| line.price().is_some_and(|p| p > Decimal::ZERO))
        .map(|line| line.subtotal())
        .sum();

    if total.is_zero() {
        None
    } else {
        Some(total)
    }
}

/// Snapshots one checked list item as a purchase line.
pub fn purchase_line(item: &Item) -> NewPurchaseItem {
    let purchased_quantity = item.purchased_quantity.unwrap_or(item.quantity);
    NewPurchaseItem {
        item_id: item.id,
        article_id: item.article_id,
        quantity: item.quantity,
        purchased_quantity,
        unit_id: item.unit_id,
        price: item.price,
        subtotal: subtotal(purchased_quantity, item.price),
        store_id: item.store_id,
        notes: item.notes.clone(),
    }
}

pub fn build_purchase(
    list_id: Uuid,
    checked: &[Item],
    request: &RecordPurchase,
    now: DateTime<Utc>,
) -> CoreResult<NewPurchase> {
    if checked.is_empty() {
        return Err(CoreError::validation(
            "items",
            "nothing to record: no checked items on this list",
        ));
    }

    let items: Vec<NewPurchaseItem> = checked.iter().map(purchase_line).collect();
    Ok(NewPurchase {
        shopping_list_id: list_id,
        purchased_at: request.purchased_at.unwrap_or(now),
        notes: request.notes.clone(),
        total_paid: total_paid(&items),
        items,
    })
}

/// Rejects negative quantities and prices on the lines of `purchase` that
/// `edit` touches. Edits naming lines of another purchase are left for
/// `apply_edits` to drop.
pub fn validate_edit(purchase: &Purchase, edit: &PurchaseEdit) -> CoreResult<()> {
    let own_lines = edit
        .items
        .iter()
        .filter(|line| purchase.items.iter().any(|l| l.id == line.id));

    for line in own_lines {
        if line.purchased_quantity.is_some_and(|q| q < Decimal::ZERO) {
            return Err(CoreError::validation(
                format!("items.{}.purchasedQuantity", line.id),
                "purchased quantity must not be negative",
            ));
        }
        if line.price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(CoreError::validation(
                format!("items.{}.price", line.id),
                "price must not be negative",
            ));
        }
    }
    Ok(())
}

/// Applies `edit` in place and recomputes the total from every line.
/// Edits naming lines of another purchase are ignored. Returns the ids of the
/// lines that were touched.
pub fn apply_edits(purchase: &mut Purchase, edit: &PurchaseEdit) -> Vec<Uuid> {
    if let Some(purchased_at) = edit.purchased_at {
        purchase.purchased_at = purchased_at;
    }
    if let Some(notes) = &edit.notes {
        purchase.notes = Some(notes.clone());
    }

    let mut touched = Vec::new();
    for line_edit in &edit.items {
        let Some(line) = purchase.items.iter_mut().find(|l| l.id == line_edit.id) else {
            debug!(purchase_id = %purchase.id, line_id = %line_edit.id, "Ignoring edit for foreign purchase line");
            continue;
        };

        if let Some(notes) = &line_edit.notes {
            line.notes = Some(notes.clone());
        }
        if line_edit.purchased_quantity.is_some() || line_edit.price.is_some() {
            line.purchased_quantity = line_edit
                .purchased_quantity
                .unwrap_or(line.purchased_quantity);
            line.price = line_edit.price.or(line.price);
            line.subtotal = subtotal(line.purchased_quantity, line.price);
        }
        if !touched.contains(&line.id) {
            touched.push(line.id);
        }
    }

    purchase.total_paid = total_paid(&purchase.items);
    touched
}
