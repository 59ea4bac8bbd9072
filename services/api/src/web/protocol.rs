//! services/api/src/web/protocol.rs
//!
//! JSON request and response bodies of the REST API, and their conversions
//! to and from the core domain types.

use chrono::{DateTime, Utc};
use pantry_core::domain::{
    IngredientSelection, ItemCheckUpdate, ItemDetails, Purchase, PurchaseEdit, PurchaseItem,
    PurchaseItemEdit, RecipeToList, RecipeToListOutcome, RecordPurchase,
};
use pantry_core::items::AddItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientSelectionRequest {
    pub article_id: Uuid,
    pub quantity: Option<Decimal>,
    pub unit_id: Option<Uuid>,
}

/// Body of `POST /lists/{listId}/items/from-recipe`.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeToListRequest {
    pub recipe_id: Uuid,
    pub servings: Option<u32>,
    /// Keyed by recipe ingredient id.
    #[serde(default)]
    pub ingredient_selections: HashMap<Uuid, IngredientSelectionRequest>,
}

impl RecipeToListRequest {
    pub fn into_domain(self) -> RecipeToList {
        RecipeToList {
            recipe_id: self.recipe_id,
            servings: self.servings,
            selections: self
                .ingredient_selections
                .into_iter()
                .map(|(ingredient_id, s)| {
                    (
                        ingredient_id,
                        IngredientSelection {
                            article_id: s.article_id,
                            quantity: s.quantity,
                            unit_id: s.unit_id,
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub article_id: Uuid,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl AddItemRequest {
    pub fn into_domain(self) -> AddItem {
        AddItem {
            article_id: self.article_id,
            quantity: self.quantity,
            unit_id: self.unit_id,
            store_id: self.store_id,
            notes: self.notes,
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckItemRequest {
    pub checked: Option<bool>,
    pub purchased_quantity: Option<Decimal>,
    pub price: Option<Decimal>,
}

impl CheckItemRequest {
    pub fn into_domain(self) -> ItemCheckUpdate {
        ItemCheckUpdate {
            checked: self.checked,
            purchased_quantity: self.purchased_quantity,
            price: self.price,
        }
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPurchaseRequest {
    pub purchased_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl RecordPurchaseRequest {
    pub fn into_domain(self) -> RecordPurchase {
        RecordPurchase {
            purchased_at: self.purchased_at,
            notes: self.notes,
        }
    }
}

/// A correction to one purchase line. Totals and subtotals are derived and
/// cannot be sent.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurchaseItemEditRequest {
    pub id: Uuid,
    pub purchased_quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Body of `PUT /purchases/{purchaseId}`.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePurchaseRequest {
    pub purchased_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<PurchaseItemEditRequest>,
}

impl UpdatePurchaseRequest {
    pub fn into_domain(self) -> PurchaseEdit {
        PurchaseEdit {
            purchased_at: self.purchased_at,
            notes: self.notes,
            items: self
                .items
                .into_iter()
                .map(|i| PurchaseItemEdit {
                    id: i.id,
                    purchased_quantity: i.purchased_quantity,
                    price: i.price,
                    notes: i.notes,
                })
                .collect(),
        }
    }
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub article_id: Uuid,
    pub article_name: String,
    pub article_brand: Option<String>,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub checked: bool,
    pub purchased_quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub store_id: Option<Uuid>,
    pub store_name: Option<String>,
    pub added_by: Uuid,
    pub added_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ItemDetails> for ItemResponse {
    fn from(details: ItemDetails) -> Self {
        let item = details.item;
        Self {
            id: item.id,
            shopping_list_id: item.shopping_list_id,
            article_id: item.article_id,
            article_name: details.article_name,
            article_brand: details.article_brand,
            product_id: details.product_id,
            product_name: details.product_name,
            quantity: item.quantity,
            unit_id: item.unit_id,
            checked: item.checked,
            purchased_quantity: item.purchased_quantity,
            price: item.price,
            notes: item.notes,
            store_id: item.store_id,
            store_name: details.store_name,
            added_by: item.added_by,
            added_by_name: details.added_by_name,
            created_at: item.created_at,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeToListResponse {
    pub message: String,
    pub added: usize,
    pub skipped: usize,
    pub unresolved: usize,
    pub items: Vec<ItemResponse>,
}

impl From<RecipeToListOutcome> for RecipeToListResponse {
    fn from(outcome: RecipeToListOutcome) -> Self {
        Self {
            message: outcome.message,
            added: outcome.added,
            skipped: outcome.skipped,
            unresolved: outcome.unresolved,
            items: outcome.items.into_iter().map(ItemResponse::from).collect(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemResponse {
    pub id: Uuid,
    pub item_id: Option<Uuid>,
    pub article_id: Uuid,
    pub quantity: Decimal,
    pub purchased_quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub subtotal: Decimal,
    pub store_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl From<PurchaseItem> for PurchaseItemResponse {
    fn from(line: PurchaseItem) -> Self {
        Self {
            id: line.id,
            item_id: line.item_id,
            article_id: line.article_id,
            quantity: line.quantity,
            purchased_quantity: line.purchased_quantity,
            unit_id: line.unit_id,
            price: line.price,
            subtotal: line.subtotal,
            store_id: line.store_id,
            notes: line.notes,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub purchased_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub total_paid: Option<Decimal>,
    pub items: Vec<PurchaseItemResponse>,
}

impl From<Purchase> for PurchaseResponse {
    fn from(purchase: Purchase) -> Self {
        Self {
            id: purchase.id,
            shopping_list_id: purchase.shopping_list_id,
            purchased_at: purchase.purchased_at,
            notes: purchase.notes,
            total_paid: purchase.total_paid,
            items: purchase
                .items
                .into_iter()
                .map(PurchaseItemResponse::from)
                .collect(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct PurchaseEnvelope {
    pub purchase: PurchaseResponse,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct PurchaseListResponse {
    pub purchases: Vec<PurchaseResponse>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ItemEnvelope {
    pub item: ItemResponse,
}
