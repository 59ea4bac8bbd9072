//! crates/pantry_core/src/memory.rs
//!
//! An in-memory implementation of the `DatabaseService` port. It enforces the
//! same (list, article) uniqueness, unit and store references, and
//! all-or-nothing purchase writes as the PostgreSQL adapter, and backs the
//! test suites.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Article, Item, ItemCheckUpdate, ItemDetails, NewItem, NewPurchase, Purchase, PurchaseEdit,
    PurchaseItem, Recipe, ShoppingList, Store, Unit, UserId,
};
use crate::ledger::apply_edits;
use crate::ports::{DatabaseService, PortError, PortResult};

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<String, UserId>,
    users: HashMap<UserId, String>,
    units: HashMap<Uuid, Unit>,
    stores: HashMap<Uuid, Store>,
    articles: HashMap<Uuid, Article>,
    recipes: HashMap<Uuid, Recipe>,
    lists: HashMap<Uuid, ShoppingList>,
    items: Vec<Item>,
    purchases: Vec<Purchase>,
}

impl MemoryState {
    fn details(&self, item: &Item) -> PortResult<ItemDetails> {
        let article = self
            .articles
            .get(&item.article_id)
            .ok_or_else(|| PortError::NotFound(format!("Article {} not found", item.article_id)))?;
        Ok(ItemDetails {
            item: item.clone(),
            article_name: article.name.clone(),
            article_brand: article.brand.clone(),
            product_id: article.product_id,
            product_name: article.product_name.clone(),
            store_name: item
                .store_id
                .and_then(|id| self.stores.get(&id).map(|s| s.name.clone())),
            added_by_name: self.users.get(&item.added_by).cloned(),
        })
    }

    /// Mirrors the foreign keys of `items.unit_id` and `items.store_id`.
    fn check_references(&self, item: &NewItem) -> PortResult<()> {
        if let Some(unit_id) = item.unit_id.filter(|id| !self.units.contains_key(id)) {
            return Err(PortError::Unexpected(format!(
                "items.unit_id references missing unit {unit_id}"
            )));
        }
        if let Some(store_id) = item.store_id.filter(|id| !self.stores.contains_key(id)) {
            return Err(PortError::Unexpected(format!(
                "items.store_id references missing store {store_id}"
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_session(&self, session_id: &str, user_id: UserId) {
        self.state
            .lock()
            .await
            .sessions
            .insert(session_id.to_string(), user_id);
    }

    pub async fn add_user(&self, user_id: UserId, name: &str) {
        self.state.lock().await.users.insert(user_id, name.to_string());
    }

    pub async fn add_unit(&self, unit: Unit) {
        self.state.lock().await.units.insert(unit.id, unit);
    }

    pub async fn add_store(&self, store: Store) {
        self.state.lock().await.stores.insert(store.id, store);
    }

    pub async fn add_article(&self, article: Article) {
        self.state.lock().await.articles.insert(article.id, article);
    }

    pub async fn add_recipe(&self, recipe: Recipe) {
        self.state.lock().await.recipes.insert(recipe.id, recipe);
    }

    pub async fn add_list(&self, list: ShoppingList) {
        self.state.lock().await.lists.insert(list.id, list);
    }

    pub async fn items_on_list(&self, list_id: Uuid) -> Vec<Item> {
        self.state
            .lock()
            .await
            .items
            .iter()
            .filter(|i| i.shopping_list_id == list_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DatabaseService for MemoryStore {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.state
            .lock()
            .await
            .sessions
            .get(session_id)
            .copied()
            .ok_or(PortError::Unauthorized)
    }

    async fn get_article(&self, article_id: Uuid) -> PortResult<Article> {
        self.state
            .lock()
            .await
            .articles
            .get(&article_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Article {} not found", article_id)))
    }

    async fn get_unit(&self, unit_id: Uuid) -> PortResult<Unit> {
        self.state
            .lock()
            .await
            .units
            .get(&unit_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Unit {} not found", unit_id)))
    }

    async fn get_store(&self, store_id: Uuid) -> PortResult<Store> {
        self.state
            .lock()
            .await
            .stores
            .get(&store_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Store {} not found", store_id)))
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> PortResult<Recipe> {
        self.state
            .lock()
            .await
            .recipes
            .get(&recipe_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Recipe {} not found", recipe_id)))
    }

    async fn get_shopping_list(&self, list_id: Uuid) -> PortResult<ShoppingList> {
        self.state
            .lock()
            .await
            .lists
            .get(&list_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Shopping list {} not found", list_id)))
    }

    async fn find_listed_articles(
        &self,
        list_id: Uuid,
        article_ids: &[Uuid],
    ) -> PortResult<Vec<Uuid>> {
        Ok(self
            .state
            .lock()
            .await
            .items
            .iter()
            .filter(|i| i.shopping_list_id == list_id && article_ids.contains(&i.article_id))
            .map(|i| i.article_id)
            .collect())
    }

    async fn insert_items(
        &self,
        list_id: Uuid,
        items: Vec<NewItem>,
    ) -> PortResult<Vec<ItemDetails>> {
        let mut state = self.state.lock().await;
        // One statement in PostgreSQL: a bad reference fails the whole batch.
        for new_item in &items {
            state.check_references(new_item)?;
        }

        let mut created = Vec::new();
        for new_item in items {
            let taken = state
                .items
                .iter()
                .any(|i| i.shopping_list_id == list_id && i.article_id == new_item.article_id);
            if taken {
                continue;
            }
            let item = Item {
                id: Uuid::new_v4(),
                shopping_list_id: list_id,
                article_id: new_item.article_id,
                quantity: new_item.quantity,
                unit_id: new_item.unit_id,
                checked: false,
                purchased_quantity: None,
                price: new_item.price,
                notes: new_item.notes,
                added_by: new_item.added_by,
                store_id: new_item.store_id,
                created_at: Utc::now(),
            };
            created.push(state.details(&item)?);
            state.items.push(item);
        }
        Ok(created)
    }

    async fn get_item(&self, item_id: Uuid) -> PortResult<Item> {
        self.state
            .lock()
            .await
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Item {} not found", item_id)))
    }

    async fn update_item_check(
        &self,
        item_id: Uuid,
        update: &ItemCheckUpdate,
    ) -> PortResult<ItemDetails> {
        let mut state = self.state.lock().await;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| PortError::NotFound(format!("Item {} not found", item_id)))?;
        if let Some(checked) = update.checked {
            item.checked = checked;
        }
        if update.purchased_quantity.is_some() {
            item.purchased_quantity = update.purchased_quantity;
        }
        if update.price.is_some() {
            item.price = update.price;
        }
        let item = item.clone();
        state.details(&item)
    }

    async fn get_checked_items(&self, list_id: Uuid) -> PortResult<Vec<Item>> {
        Ok(self
            .state
            .lock()
            .await
            .items
            .iter()
            .filter(|i| i.shopping_list_id == list_id && i.checked)
            .cloned()
            .collect())
    }

    async fn create_purchase(&self, purchase: NewPurchase) -> PortResult<Purchase> {
        let mut state = self.state.lock().await;
        let id = Uuid::new_v4();
        let record = Purchase {
            id,
            shopping_list_id: purchase.shopping_list_id,
            purchased_at: purchase.purchased_at,
            notes: purchase.notes,
            total_paid: purchase.total_paid,
            items: purchase
                .items
                .into_iter()
                .map(|line| PurchaseItem {
                    id: Uuid::new_v4(),
                    purchase_id: id,
                    item_id: Some(line.item_id),
                    article_id: line.article_id,
                    quantity: line.quantity,
                    purchased_quantity: line.purchased_quantity,
                    unit_id: line.unit_id,
                    price: line.price,
                    subtotal: line.subtotal,
                    store_id: line.store_id,
                    notes: line.notes,
                })
                .collect(),
        };
        state.purchases.push(record.clone());
        Ok(record)
    }

    async fn get_purchase(&self, purchase_id: Uuid) -> PortResult<Purchase> {
        self.state
            .lock()
            .await
            .purchases
            .iter()
            .find(|p| p.id == purchase_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Purchase {} not found", purchase_id)))
    }

    async fn get_purchases_for_list(&self, list_id: Uuid) -> PortResult<Vec<Purchase>> {
        let mut purchases: Vec<Purchase> = self
            .state
            .lock()
            .await
            .purchases
            .iter()
            .filter(|p| p.shopping_list_id == list_id)
            .cloned()
            .collect();
        purchases.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        Ok(purchases)
    }

    async fn reconcile_purchase(
        &self,
        purchase_id: Uuid,
        edit: &PurchaseEdit,
    ) -> PortResult<Purchase> {
        let mut state = self.state.lock().await;
        let purchase = state
            .purchases
            .iter_mut()
            .find(|p| p.id == purchase_id)
            .ok_or_else(|| PortError::NotFound(format!("Purchase {} not found", purchase_id)))?;
        apply_edits(purchase, edit);
        Ok(purchase.clone())
    }
}
