//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pantry_core::domain::{
    Article, Item, ItemCheckUpdate, ItemDetails, ListShare, NewItem, NewPurchase, Purchase,
    PurchaseEdit, PurchaseItem, Recipe, RecipeIngredient, ShoppingList, Store, Unit,
};
use pantry_core::ledger::apply_edits;
use pantry_core::ports::{DatabaseService, PortError, PortResult};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: impl FnOnce() -> String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what()),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ArticleRecord {
    id: Uuid,
    product_id: Uuid,
    product_name: String,
    name: String,
    brand: Option<String>,
    suggested_price: Option<Decimal>,
    default_store_id: Option<Uuid>,
    is_general: bool,
    owner_id: Option<Uuid>,
}
impl ArticleRecord {
    fn to_domain(self) -> Article {
        Article {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name,
            name: self.name,
            brand: self.brand,
            suggested_price: self.suggested_price,
            default_store_id: self.default_store_id,
            is_general: self.is_general,
            owner_id: self.owner_id,
        }
    }
}

#[derive(FromRow)]
struct UnitRecord {
    id: Uuid,
    name: String,
    abbreviation: Option<String>,
}
impl UnitRecord {
    fn to_domain(self) -> Unit {
        Unit {
            id: self.id,
            name: self.name,
            abbreviation: self.abbreviation,
        }
    }
}

#[derive(FromRow)]
struct StoreRecord {
    id: Uuid,
    name: String,
    is_general: bool,
    owner_id: Option<Uuid>,
}
impl StoreRecord {
    fn to_domain(self) -> Store {
        Store {
            id: self.id,
            name: self.name,
            is_general: self.is_general,
            owner_id: self.owner_id,
        }
    }
}

#[derive(FromRow)]
struct RecipeRecord {
    id: Uuid,
    name: String,
    servings: Option<i32>,
    is_general: bool,
    owner_id: Option<Uuid>,
}
impl RecipeRecord {
    fn to_domain(self, ingredients: Vec<RecipeIngredient>) -> Recipe {
        Recipe {
            id: self.id,
            name: self.name,
            servings: self.servings.and_then(|s| u32::try_from(s).ok()),
            is_general: self.is_general,
            owner_id: self.owner_id,
            ingredients,
        }
    }
}

#[derive(FromRow)]
struct RecipeIngredientRecord {
    id: Uuid,
    recipe_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: Decimal,
    unit_id: Option<Uuid>,
    default_article_id: Option<Uuid>,
    notes: Option<String>,
    is_optional: bool,
}
impl RecipeIngredientRecord {
    fn to_domain(self) -> RecipeIngredient {
        RecipeIngredient {
            id: self.id,
            recipe_id: self.recipe_id,
            product_id: self.product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            unit_id: self.unit_id,
            default_article_id: self.default_article_id,
            notes: self.notes,
            is_optional: self.is_optional,
        }
    }
}

#[derive(FromRow)]
struct ShoppingListRecord {
    id: Uuid,
    name: String,
    owner_id: Uuid,
}

#[derive(FromRow)]
struct ListShareRecord {
    user_id: Uuid,
    can_edit: bool,
}

#[derive(FromRow)]
struct ItemRecord {
    id: Uuid,
    shopping_list_id: Uuid,
    article_id: Uuid,
    quantity: Decimal,
    unit_id: Option<Uuid>,
    checked: bool,
    purchased_quantity: Option<Decimal>,
    price: Option<Decimal>,
    notes: Option<String>,
    added_by: Uuid,
    store_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}
impl ItemRecord {
    fn to_domain(self) -> Item {
        Item {
            id: self.id,
            shopping_list_id: self.shopping_list_id,
            article_id: self.article_id,
            quantity: self.quantity,
            unit_id: self.unit_id,
            checked: self.checked,
            purchased_quantity: self.purchased_quantity,
            price: self.price,
            notes: self.notes,
            added_by: self.added_by,
            store_id: self.store_id,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ItemDetailsRecord {
    #[sqlx(flatten)]
    item: ItemRecord,
    article_name: String,
    article_brand: Option<String>,
    product_id: Uuid,
    product_name: String,
    store_name: Option<String>,
    added_by_name: Option<String>,
}
impl ItemDetailsRecord {
    fn to_domain(self) -> ItemDetails {
        ItemDetails {
            item: self.item.to_domain(),
            article_name: self.article_name,
            article_brand: self.article_brand,
            product_id: self.product_id,
            product_name: self.product_name,
            store_name: self.store_name,
            added_by_name: self.added_by_name,
        }
    }
}

#[derive(FromRow)]
struct PurchaseRecord {
    id: Uuid,
    shopping_list_id: Uuid,
    purchased_at: DateTime<Utc>,
    notes: Option<String>,
    total_paid: Option<Decimal>,
}
impl PurchaseRecord {
    fn to_domain(self, items: Vec<PurchaseItem>) -> Purchase {
        Purchase {
            id: self.id,
            shopping_list_id: self.shopping_list_id,
            purchased_at: self.purchased_at,
            notes: self.notes,
            total_paid: self.total_paid,
            items,
        }
    }
}

#[derive(FromRow)]
struct PurchaseItemRecord {
    id: Uuid,
    purchase_id: Uuid,
    item_id: Option<Uuid>,
    article_id: Uuid,
    quantity: Decimal,
    purchased_quantity: Decimal,
    unit_id: Option<Uuid>,
    price: Option<Decimal>,
    subtotal: Decimal,
    store_id: Option<Uuid>,
    notes: Option<String>,
}
impl PurchaseItemRecord {
    fn to_domain(self) -> PurchaseItem {
        PurchaseItem {
            id: self.id,
            purchase_id: self.purchase_id,
            item_id: self.item_id,
            article_id: self.article_id,
            quantity: self.quantity,
            purchased_quantity: self.purchased_quantity,
            unit_id: self.unit_id,
            price: self.price,
            subtotal: self.subtotal,
            store_id: self.store_id,
            notes: self.notes,
        }
    }
}

//=========================================================================================
// Shared SQL
//=========================================================================================

const ITEM_DETAILS_SELECT: &str = "SELECT i.id, i.shopping_list_id, i.article_id, i.quantity, i.unit_id, \
     i.checked, i.purchased_quantity, i.price, i.notes, i.added_by, i.store_id, i.created_at, \
     a.name AS article_name, a.brand AS article_brand, a.product_id, p.name AS product_name, \
     s.name AS store_name, u.name AS added_by_name \
     FROM items i \
     JOIN articles a ON a.id = i.article_id \
     JOIN products p ON p.id = a.product_id \
     LEFT JOIN stores s ON s.id = i.store_id \
     LEFT JOIN users u ON u.id = i.added_by";

const PURCHASE_ITEM_COLUMNS: &str = "id, purchase_id, item_id, article_id, quantity, \
     purchased_quantity, unit_id, price, subtotal, store_id, notes";

impl DbAdapter {
    /// Loads item details for `ids`, returned in the order of `ids`.
    async fn item_details(&self, ids: &[Uuid]) -> PortResult<Vec<ItemDetails>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = sqlx::query_as::<_, ItemDetailsRecord>(&format!(
            "{ITEM_DETAILS_SELECT} WHERE i.id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut by_id: HashMap<Uuid, ItemDetails> = records
            .into_iter()
            .map(|r| (r.item.id, r.to_domain()))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn purchase_items(
        conn: &mut PgConnection,
        purchase_ids: &[Uuid],
    ) -> PortResult<HashMap<Uuid, Vec<PurchaseItem>>> {
        let records = sqlx::query_as::<_, PurchaseItemRecord>(&format!(
            "SELECT {PURCHASE_ITEM_COLUMNS} FROM purchase_items \
             WHERE purchase_id = ANY($1) ORDER BY position ASC"
        ))
        .bind(purchase_ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(unexpected)?;

        let mut grouped: HashMap<Uuid, Vec<PurchaseItem>> = HashMap::new();
        for record in records {
            grouped
                .entry(record.purchase_id)
                .or_default()
                .push(record.to_domain());
        }
        Ok(grouped)
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn get_article(&self, article_id: Uuid) -> PortResult<Article> {
        let record = sqlx::query_as::<_, ArticleRecord>(
            "SELECT a.id, a.product_id, p.name AS product_name, a.name, a.brand, \
             a.suggested_price, a.default_store_id, a.is_general, a.owner_id \
             FROM articles a JOIN products p ON p.id = a.product_id WHERE a.id = $1",
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("Article {} not found", article_id)))?;
        Ok(record.to_domain())
    }

    async fn get_unit(&self, unit_id: Uuid) -> PortResult<Unit> {
        let record = sqlx::query_as::<_, UnitRecord>(
            "SELECT id, name, abbreviation FROM units WHERE id = $1",
        )
        .bind(unit_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("Unit {} not found", unit_id)))?;
        Ok(record.to_domain())
    }

    async fn get_store(&self, store_id: Uuid) -> PortResult<Store> {
        let record = sqlx::query_as::<_, StoreRecord>(
            "SELECT id, name, is_general, owner_id FROM stores WHERE id = $1",
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("Store {} not found", store_id)))?;
        Ok(record.to_domain())
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> PortResult<Recipe> {
        let record = sqlx::query_as::<_, RecipeRecord>(
            "SELECT id, name, servings, is_general, owner_id FROM recipes WHERE id = $1",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("Recipe {} not found", recipe_id)))?;

        let ingredients = sqlx::query_as::<_, RecipeIngredientRecord>(
            "SELECT ri.id, ri.recipe_id, ri.product_id, p.name AS product_name, ri.quantity, \
             ri.unit_id, ri.default_article_id, ri.notes, ri.is_optional \
             FROM recipe_ingredients ri JOIN products p ON p.id = ri.product_id \
             WHERE ri.recipe_id = $1 ORDER BY ri.position ASC, ri.id ASC",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(|r| r.to_domain())
        .collect();

        Ok(record.to_domain(ingredients))
    }

    async fn get_shopping_list(&self, list_id: Uuid) -> PortResult<ShoppingList> {
        let record = sqlx::query_as::<_, ShoppingListRecord>(
            "SELECT id, name, owner_id FROM shopping_lists WHERE id = $1",
        )
        .bind(list_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("Shopping list {} not found", list_id)))?;

        let shares = sqlx::query_as::<_, ListShareRecord>(
            "SELECT user_id, can_edit FROM shopping_list_shares WHERE shopping_list_id = $1",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(|s| ListShare {
            user_id: s.user_id,
            can_edit: s.can_edit,
        })
        .collect();

        Ok(ShoppingList {
            id: record.id,
            name: record.name,
            owner_id: record.owner_id,
            shares,
        })
    }

    async fn find_listed_articles(
        &self,
        list_id: Uuid,
        article_ids: &[Uuid],
    ) -> PortResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT article_id FROM items WHERE shopping_list_id = $1 AND article_id = ANY($2)",
        )
        .bind(list_id)
        .bind(article_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn insert_items(
        &self,
        list_id: Uuid,
        items: Vec<NewItem>,
    ) -> PortResult<Vec<ItemDetails>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let planned: Vec<(Uuid, NewItem)> =
            items.into_iter().map(|item| (Uuid::new_v4(), item)).collect();

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO items (id, shopping_list_id, article_id, quantity, unit_id, price, \
             notes, added_by, store_id) ",
        );
        builder.push_values(&planned, |mut row, (id, item)| {
            row.push_bind(*id)
                .push_bind(list_id)
                .push_bind(item.article_id)
                .push_bind(item.quantity)
                .push_bind(item.unit_id)
                .push_bind(item.price)
                .push_bind(item.notes.clone())
                .push_bind(item.added_by)
                .push_bind(item.store_id);
        });
        builder.push(" ON CONFLICT (shopping_list_id, article_id) DO NOTHING RETURNING id");

        let inserted: Vec<Uuid> = builder
            .build_query_scalar::<Uuid>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        debug!(%list_id, planned = planned.len(), inserted = inserted.len(), "Inserted list items");

        // Keep the caller's order for the rows that made it in.
        let ordered: Vec<Uuid> = planned
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| inserted.contains(id))
            .collect();
        self.item_details(&ordered).await
    }

    async fn get_item(&self, item_id: Uuid) -> PortResult<Item> {
        let record = sqlx::query_as::<_, ItemRecord>(
            "SELECT id, shopping_list_id, article_id, quantity, unit_id, checked, \
             purchased_quantity, price, notes, added_by, store_id, created_at \
             FROM items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("Item {} not found", item_id)))?;
        Ok(record.to_domain())
    }

    async fn update_item_check(
        &self,
        item_id: Uuid,
        update: &ItemCheckUpdate,
    ) -> PortResult<ItemDetails> {
        let result = sqlx::query(
            "UPDATE items SET checked = COALESCE($2, checked), \
             purchased_quantity = COALESCE($3, purchased_quantity), \
             price = COALESCE($4, price) WHERE id = $1",
        )
        .bind(item_id)
        .bind(update.checked)
        .bind(update.purchased_quantity)
        .bind(update.price)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Item {} not found", item_id)));
        }
        self.item_details(&[item_id])
            .await?
            .pop()
            .ok_or_else(|| PortError::NotFound(format!("Item {} not found", item_id)))
    }

    async fn get_checked_items(&self, list_id: Uuid) -> PortResult<Vec<Item>> {
        let records = sqlx::query_as::<_, ItemRecord>(
            "SELECT id, shopping_list_id, article_id, quantity, unit_id, checked, \
             purchased_quantity, price, notes, added_by, store_id, created_at \
             FROM items WHERE shopping_list_id = $1 AND checked \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_purchase(&self, purchase: NewPurchase) -> PortResult<Purchase> {
        let purchase_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO purchases (id, shopping_list_id, purchased_at, notes, total_paid) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(purchase_id)
        .bind(purchase.shopping_list_id)
        .bind(purchase.purchased_at)
        .bind(&purchase.notes)
        .bind(purchase.total_paid)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        let lines: Vec<PurchaseItem> = purchase
            .items
            .into_iter()
            .map(|line| PurchaseItem {
                id: Uuid::new_v4(),
                purchase_id,
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
            .collect();

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO purchase_items (id, purchase_id, item_id, article_id, quantity, \
             purchased_quantity, unit_id, price, subtotal, store_id, notes, position) ",
        );
        builder.push_values(lines.iter().enumerate(), |mut row, (position, line)| {
            row.push_bind(line.id)
                .push_bind(line.purchase_id)
                .push_bind(line.item_id)
                .push_bind(line.article_id)
                .push_bind(line.quantity)
                .push_bind(line.purchased_quantity)
                .push_bind(line.unit_id)
                .push_bind(line.price)
                .push_bind(line.subtotal)
                .push_bind(line.store_id)
                .push_bind(line.notes.clone())
                .push_bind(position as i32);
        });
        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        // Dropping `tx` before this point rolls back both inserts.
        tx.commit().await.map_err(unexpected)?;

        Ok(Purchase {
            id: purchase_id,
            shopping_list_id: purchase.shopping_list_id,
            purchased_at: purchase.purchased_at,
            notes: purchase.notes,
            total_paid: purchase.total_paid,
            items: lines,
        })
    }

    async fn get_purchase(&self, purchase_id: Uuid) -> PortResult<Purchase> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        let record = sqlx::query_as::<_, PurchaseRecord>(
            "SELECT id, shopping_list_id, purchased_at, notes, total_paid \
             FROM purchases WHERE id = $1",
        )
        .bind(purchase_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("Purchase {} not found", purchase_id)))?;

        let mut items = Self::purchase_items(&mut *conn, &[purchase_id]).await?;
        Ok(record.to_domain(items.remove(&purchase_id).unwrap_or_default()))
    }

    async fn get_purchases_for_list(&self, list_id: Uuid) -> PortResult<Vec<Purchase>> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        let records = sqlx::query_as::<_, PurchaseRecord>(
            "SELECT id, shopping_list_id, purchased_at, notes, total_paid \
             FROM purchases WHERE shopping_list_id = $1 ORDER BY purchased_at DESC",
        )
        .bind(list_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(unexpected)?;

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let mut items = Self::purchase_items(&mut *conn, &ids).await?;
        Ok(records
            .into_iter()
            .map(|r| {
                let lines = items.remove(&r.id).unwrap_or_default();
                r.to_domain(lines)
            })
            .collect())
    }

    async fn reconcile_purchase(
        &self,
        purchase_id: Uuid,
        edit: &PurchaseEdit,
    ) -> PortResult<Purchase> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // The row lock serializes concurrent reconciliations of one purchase.
        let record = sqlx::query_as::<_, PurchaseRecord>(
            "SELECT id, shopping_list_id, purchased_at, notes, total_paid \
             FROM purchases WHERE id = $1 FOR UPDATE",
        )
        .bind(purchase_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("Purchase {} not found", purchase_id)))?;

        let mut items = Self::purchase_items(&mut *tx, &[purchase_id]).await?;
        let mut purchase = record.to_domain(items.remove(&purchase_id).unwrap_or_default());
        let touched = apply_edits(&mut purchase, edit);

        for line in purchase.items.iter().filter(|l| touched.contains(&l.id)) {
            sqlx::query(
                "UPDATE purchase_items SET purchased_quantity = $2, price = $3, \
                 subtotal = $4, notes = $5 WHERE id = $1 AND purchase_id = $6",
            )
            .bind(line.id)
            .bind(line.purchased_quantity)
            .bind(line.price)
            .bind(line.subtotal)
            .bind(&line.notes)
            .bind(purchase_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        sqlx::query(
            "UPDATE purchases SET purchased_at = $2, notes = $3, total_paid = $4 WHERE id = $1",
        )
        .bind(purchase_id)
        .bind(purchase.purchased_at)
        .bind(&purchase.notes)
        .bind(purchase.total_paid)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(purchase)
    }
}
