//! Shared fixtures for the core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use pantry_core::domain::{NewItem, NewPurchase};
use pantry_core::memory::MemoryStore;
use pantry_core::{
    Article, DatabaseService, Item, ItemCheckUpdate, ItemDetails, ListShare, PortResult, Purchase,
    PurchaseEdit, Recipe, RecipeIngredient, ShoppingList, Store, Unit,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn d(value: &str) -> Decimal {
    value.parse().unwrap()
}

pub struct Kitchen {
    pub db: MemoryStore,
    pub owner: Uuid,
    pub stranger: Uuid,
    pub list_id: Uuid,
    pub flour: Uuid,
    pub milk: Uuid,
    pub eggs: Uuid,
}

pub fn article(product_id: Uuid, product_name: &str, name: &str, price: Option<&str>) -> Article {
    Article {
        id: Uuid::new_v4(),
        product_id,
        product_name: product_name.to_string(),
        name: name.to_string(),
        brand: None,
        suggested_price: price.map(d),
        default_store_id: None,
        is_general: true,
        owner_id: None,
    }
}

pub fn ingredient(
    recipe_id: Uuid,
    product_id: Uuid,
    product_name: &str,
    quantity: &str,
    default_article_id: Option<Uuid>,
) -> RecipeIngredient {
    RecipeIngredient {
        id: Uuid::new_v4(),
        recipe_id,
        product_id,
        product_name: product_name.to_string(),
        quantity: d(quantity),
        unit_id: None,
        default_article_id,
        notes: None,
        is_optional: false,
    }
}

impl Kitchen {
    /// A general catalog with three products, one default article each, and an
    /// empty list owned by `owner`.
    pub async fn new() -> Self {
        let db = MemoryStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        db.add_user(owner, "Alice").await;

        let flour = Uuid::new_v4();
        let milk = Uuid::new_v4();
        let eggs = Uuid::new_v4();

        let list_id = Uuid::new_v4();
        db.add_list(ShoppingList {
            id: list_id,
            name: "Weekly".to_string(),
            owner_id: owner,
            shares: vec![ListShare {
                user_id: stranger,
                can_edit: false,
            }],
        })
        .await;

        Self {
            db,
            owner,
            stranger,
            list_id,
            flour,
            milk,
            eggs,
        }
    }

    pub async fn stock(&self, product_id: Uuid, product_name: &str, price: Option<&str>) -> Article {
        let article = article(product_id, product_name, product_name, price);
        self.db.add_article(article.clone()).await;
        article
    }

    pub async fn recipe(&self, servings: Option<u32>, ingredients: Vec<RecipeIngredient>) -> Recipe {
        let recipe = Recipe {
            id: ingredients.first().map(|i| i.recipe_id).unwrap_or_else(Uuid::new_v4),
            name: "Crêpes".to_string(),
            servings,
            is_general: true,
            owner_id: None,
            ingredients,
        };
        self.db.add_recipe(recipe.clone()).await;
        recipe
    }

    pub async fn unit(&self, name: &str) -> Unit {
        let unit = Unit {
            id: Uuid::new_v4(),
            name: name.to_string(),
            abbreviation: None,
        };
        self.db.add_unit(unit.clone()).await;
        unit
    }

    /// A store, private to `owner` when one is given.
    pub async fn store(&self, name: &str, owner: Option<Uuid>) -> Store {
        let store = Store {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_general: owner.is_none(),
            owner_id: owner,
        };
        self.db.add_store(store.clone()).await;
        store
    }
}

/// Wraps the store so that `find_listed_articles` sees nothing, as a lookup
/// racing a concurrent insert would.
pub struct StaleReads<'a>(pub &'a MemoryStore);

#[async_trait]
impl DatabaseService for StaleReads<'_> {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.0.validate_auth_session(session_id).await
    }

    async fn get_article(&self, article_id: Uuid) -> PortResult<Article> {
        self.0.get_article(article_id).await
    }

    async fn get_unit(&self, unit_id: Uuid) -> PortResult<Unit> {
        self.0.get_unit(unit_id).await
    }

    async fn get_store(&self, store_id: Uuid) -> PortResult<Store> {
        self.0.get_store(store_id).await
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> PortResult<Recipe> {
        self.0.get_recipe(recipe_id).await
    }

    async fn get_shopping_list(&self, list_id: Uuid) -> PortResult<ShoppingList> {
        self.0.get_shopping_list(list_id).await
    }

    async fn find_listed_articles(&self, _list_id: Uuid, _article_ids: &[Uuid]) -> PortResult<Vec<Uuid>> {
        Ok(Vec::new())
    }

    async fn insert_items(&self, list_id: Uuid, items: Vec<NewItem>) -> PortResult<Vec<ItemDetails>> {
        self.0.insert_items(list_id, items).await
    }

    async fn get_item(&self, item_id: Uuid) -> PortResult<Item> {
        self.0.get_item(item_id).await
    }

    async fn update_item_check(&self, item_id: Uuid, update: &ItemCheckUpdate) -> PortResult<ItemDetails> {
        self.0.update_item_check(item_id, update).await
    }

    async fn get_checked_items(&self, list_id: Uuid) -> PortResult<Vec<Item>> {
        self.0.get_checked_items(list_id).await
    }

    async fn create_purchase(&self, purchase: NewPurchase) -> PortResult<Purchase> {
        self.0.create_purchase(purchase).await
    }

    async fn get_purchase(&self, purchase_id: Uuid) -> PortResult<Purchase> {
        self.0.get_purchase(purchase_id).await
    }

    async fn get_purchases_for_list(&self, list_id: Uuid) -> PortResult<Vec<Purchase>> {
        self.0.get_purchases_for_list(list_id).await
    }

    async fn reconcile_purchase(&self, purchase_id: Uuid, edit: &PurchaseEdit) -> PortResult<Purchase> {
        self.0.reconcile_purchase(purchase_id, edit).await
    }
}
