//! crates/pantry_core/src/materializer.rs
//!
//! Turns resolved, scaled ingredients into shopping-list items, skipping every
//! article the list already carries.

use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{ItemDetails, NewItem, ResolvedIngredient, UserId};
use crate::error::CoreResult;
use crate::ports::DatabaseService;

#[derive(Debug, Clone)]
pub struct Materialized {
    pub items: Vec<ItemDetails>,
    pub skipped: usize,
}

impl Materialized {
    pub fn added(&self) -> usize {
        self.items.len()
    }
}

/// Splits candidates into items to insert and a skip count. An article counts as
/// present if it is already listed or appeared earlier in `candidates`.
pub fn partition_new_items(
    candidates: &[ResolvedIngredient],
    already_listed: &HashSet<Uuid>,
    added_by: UserId,
) -> (Vec<NewItem>, usize) {
    let mut seen = already_listed.clone();
    let mut to_add = Vec::new();
    let mut skipped = 0;

    for candidate in candidates {
        if !seen.insert(candidate.article.id) {
            skipped += 1;
            continue;
        }
        to_add.push(NewItem {
            article_id: candidate.article.id,
            quantity: candidate.quantity,
            unit_id: candidate.unit_id,
            price: candidate.article.suggested_price,
            notes: candidate.notes.clone(),
            added_by,
            store_id: candidate.article.default_store_id,
        });
    }

    (to_add, skipped)
}

pub async fn materialize(
    db: &dyn DatabaseService,
    list_id: Uuid,
    candidates: &[ResolvedIngredient],
    added_by: UserId,
) -> CoreResult<Materialized> {
    let article_ids: Vec<Uuid> = candidates.iter().map(|c| c.article.id).collect();
    let already_listed: HashSet<Uuid> = db
        .find_listed_articles(list_id, &article_ids)
        .await?
        .into_iter()
        .collect();

    let (to_add, mut skipped) = partition_new_items(candidates, &already_listed, added_by);
    if to_add.is_empty() {
        info!(%list_id, skipped, "Every candidate article is already on the list");
        return Ok(Materialized {
            items: Vec::new(),
            skipped,
        });
    }

    let attempted = to_add.len();
    let items = db.insert_items(list_id, to_add).await?;
    if items.len() < attempted {
        // Another request added some of these articles after our lookup.
        let raced = attempted - items.len();
        warn!(%list_id, raced, "Articles were added concurrently, counting them as skipped");
        skipped += raced;
    }

    Ok(Materialized { items, skipped })
}
