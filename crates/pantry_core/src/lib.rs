pub mod access;
pub mod catalog;
pub mod conversion;
pub mod domain;
pub mod error;
pub mod items;
pub mod ledger;
pub mod materializer;
pub mod memory;
pub mod ports;
pub mod purchases;
pub mod resolver;
pub mod scaling;

pub use domain::{
    Article, IngredientSelection, IngredientSelections, Item, ItemCheckUpdate, ItemDetails,
    ListShare, Purchase, PurchaseEdit, PurchaseItem, PurchaseItemEdit, Recipe, RecipeIngredient,
    RecipeToList, RecipeToListOutcome, RecordPurchase, ShoppingList, Store, Unit, UserId,
};
pub use error::{CoreError, CoreResult};
pub use ports::{DatabaseService, PortError, PortResult};
