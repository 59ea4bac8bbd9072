//! crates/pantry_core/src/ports.rs
//!
//! Defines the persistence contract for the application's core logic.
//! This trait forms the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete database.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Article, Item, ItemCheckUpdate, ItemDetails, NewItem, NewPurchase, Purchase, PurchaseEdit,
    Recipe, ShoppingList, Store, Unit,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth ---
    /// Resolves a session cookie to the user it belongs to.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    // --- Catalog ---
    async fn get_article(&self, article_id: Uuid) -> PortResult<Article>;

    async fn get_unit(&self, unit_id: Uuid) -> PortResult<Unit>;

    async fn get_store(&self, store_id: Uuid) -> PortResult<Store>;

    /// Loads a recipe together with all of its ingredients.
    async fn get_recipe(&self, recipe_id: Uuid) -> PortResult<Recipe>;

    // --- Shopping lists ---
    async fn get_shopping_list(&self, list_id: Uuid) -> PortResult<ShoppingList>;

    /// Returns the subset of `article_ids` that already have an item on the list.
    async fn find_listed_articles(
        &self,
        list_id: Uuid,
        article_ids: &[Uuid],
    ) -> PortResult<Vec<Uuid>>;

    /// Bulk insert. Rows colliding with the (list, article) uniqueness constraint
    /// are dropped; only the rows actually created are returned.
    async fn insert_items(&self, list_id: Uuid, items: Vec<NewItem>)
        -> PortResult<Vec<ItemDetails>>;

    async fn get_item(&self, item_id: Uuid) -> PortResult<Item>;

    async fn update_item_check(&self, item_id: Uuid, update: &ItemCheckUpdate)
        -> PortResult<ItemDetails>;

    async fn get_checked_items(&self, list_id: Uuid) -> PortResult<Vec<Item>>;

    // --- Purchases ---
    /// Persists a purchase and all of its lines atomically.
    async fn create_purchase(&self, purchase: NewPurchase) -> PortResult<Purchase>;

    async fn get_purchase(&self, purchase_id: Uuid) -> PortResult<Purchase>;

    async fn get_purchases_for_list(&self, list_id: Uuid) -> PortResult<Vec<Purchase>>;

    /// Applies `edit` with [`crate::ledger::apply_edits`] and stores the result,
    /// serialized against concurrent edits of the same purchase.
    async fn reconcile_purchase(&self, purchase_id: Uuid, edit: &PurchaseEdit)
        -> PortResult<Purchase>;
}
