//! crates/pantry_core/src/domain.rs
//!
//! Defines the pure, core data structures for the pantry application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

pub type UserId = Uuid;

//=========================================================================================
// Catalog
//=========================================================================================

/// A concrete, purchasable variant of a product (e.g. a brand of flour).
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub name: String,
    pub brand: Option<String>,
    pub suggested_price: Option<Decimal>,
    pub default_store_id: Option<Uuid>,
    pub is_general: bool,
    pub owner_id: Option<UserId>,
}

impl Article {
    /// Human readable label used in error messages ("Flour (Acme)").
    pub fn display_name(&self) -> String {
        match &self.brand {
            Some(brand) if !brand.is_empty() => format!("{} ({})", self.name, brand),
            _ => self.name.clone(),
        }
    }
}

/// A unit of measure ("g", "ml", "piece").
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub id: Uuid,
    pub name: String,
    pub abbreviation: Option<String>,
}

/// Where an item is bought. Private stores belong to one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub is_general: bool,
    pub owner_id: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    /// Base servings; `None` means the quantities are given for one serving.
    pub servings: Option<u32>,
    pub is_general: bool,
    pub owner_id: Option<UserId>,
    pub ingredients: Vec<RecipeIngredient>,
}

#[derive(Debug, Clone)]
pub struct RecipeIngredient {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub default_article_id: Option<Uuid>,
    pub notes: Option<String>,
    pub is_optional: bool,
}

//=========================================================================================
// Shopping lists
//=========================================================================================

#[derive(Debug, Clone)]
pub struct ListShare {
    pub user_id: UserId,
    pub can_edit: bool,
}

#[derive(Debug, Clone)]
pub struct ShoppingList {
    pub id: Uuid,
    pub name: String,
    pub owner_id: UserId,
    pub shares: Vec<ListShare>,
}

/// A shopping-list line. At most one exists per (list, article).
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub article_id: Uuid,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub checked: bool,
    pub purchased_quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub added_by: UserId,
    pub store_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// An item that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub article_id: Uuid,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub added_by: UserId,
    pub store_id: Option<Uuid>,
}

/// An item joined with the names a client needs to render it.
#[derive(Debug, Clone)]
pub struct ItemDetails {
    pub item: Item,
    pub article_name: String,
    pub article_brand: Option<String>,
    pub product_id: Uuid,
    pub product_name: String,
    pub store_name: Option<String>,
    pub added_by_name: Option<String>,
}

/// Changes to the "obtained" state of a list item.
#[derive(Debug, Clone, Default)]
pub struct ItemCheckUpdate {
    pub checked: Option<bool>,
    pub purchased_quantity: Option<Decimal>,
    pub price: Option<Decimal>,
}

//=========================================================================================
// Recipe conversion
//=========================================================================================

/// An explicit article choice for one recipe ingredient.
#[derive(Debug, Clone)]
pub struct IngredientSelection {
    pub article_id: Uuid,
    pub quantity: Option<Decimal>,
    pub unit_id: Option<Uuid>,
}

pub type IngredientSelections = HashMap<Uuid, IngredientSelection>;

/// A recipe ingredient for which a concrete article has been determined.
#[derive(Debug, Clone)]
pub struct ResolvedIngredient {
    pub ingredient_id: Uuid,
    pub article: Article,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecipeToList {
    pub recipe_id: Uuid,
    pub servings: Option<u32>,
    pub selections: IngredientSelections,
}

#[derive(Debug, Clone)]
pub struct RecipeToListOutcome {
    pub message: String,
    pub added: usize,
    pub skipped: usize,
    pub unresolved: usize,
    pub items: Vec<ItemDetails>,
}

//=========================================================================================
// Purchases
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub purchased_at: DateTime<Utc>,
    pub notes: Option<String>,
    /// `None` when no line carries a positive price.
    pub total_paid: Option<Decimal>,
    pub items: Vec<PurchaseItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseItem {
    pub id: Uuid,
    pub purchase_id: Uuid,
    /// The originating list item; cleared if that item is later removed.
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

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub shopping_list_id: Uuid,
    pub purchased_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub total_paid: Option<Decimal>,
    pub items: Vec<NewPurchaseItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchaseItem {
    pub item_id: Uuid,
    pub article_id: Uuid,
    pub quantity: Decimal,
    pub purchased_quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub subtotal: Decimal,
    pub store_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordPurchase {
    pub purchased_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseEdit {
    pub purchased_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub items: Vec<PurchaseItemEdit>,
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseItemEdit {
    pub id: Uuid,
    pub purchased_quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
}
