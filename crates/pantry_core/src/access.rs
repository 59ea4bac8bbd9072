//! crates/pantry_core/src/access.rs
//!
//! The "general or owned by the current user" capability check, written once
//! and shared by every catalog entity, plus the edit/view rules for lists.

use uuid::Uuid;

use crate::domain::{Article, Recipe, ShoppingList, Store, UserId};
use crate::error::{CoreError, CoreResult};
use crate::ports::DatabaseService;

/// An entity that is either visible to everyone or private to its owner.
pub trait Shareable {
    fn is_general(&self) -> bool;
    fn owner_id(&self) -> Option<UserId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub has_access: bool,
    pub is_owner: bool,
}

pub fn can_access<E: Shareable + ?Sized>(entity: &E, user_id: UserId) -> Access {
    let is_owner = entity.owner_id() == Some(user_id);
    Access {
        has_access: entity.is_general() || is_owner,
        is_owner,
    }
}

pub fn accessible<E: Shareable + ?Sized>(entity: &E, user_id: UserId) -> bool {
    can_access(entity, user_id).has_access
}

impl Shareable for Article {
    fn is_general(&self) -> bool {
        self.is_general
    }

    fn owner_id(&self) -> Option<UserId> {
        self.owner_id
    }
}

impl Shareable for Recipe {
    fn is_general(&self) -> bool {
        self.is_general
    }

    fn owner_id(&self) -> Option<UserId> {
        self.owner_id
    }
}

impl Shareable for Store {
    fn is_general(&self) -> bool {
        self.is_general
    }

    fn owner_id(&self) -> Option<UserId> {
        self.owner_id
    }
}

pub fn can_view_list(list: &ShoppingList, user_id: UserId) -> bool {
    list.owner_id == user_id || list.shares.iter().any(|s| s.user_id == user_id)
}

pub fn can_edit_list(list: &ShoppingList, user_id: UserId) -> bool {
    list.owner_id == user_id
        || list
            .shares
            .iter()
            .any(|s| s.user_id == user_id && s.can_edit)
}

/// Loads a list the user may add to, check off, or record purchases on.
pub async fn editable_list(
    db: &dyn DatabaseService,
    user_id: UserId,
    list_id: Uuid,
) -> CoreResult<ShoppingList> {
    let list = db.get_shopping_list(list_id).await?;
    if !can_edit_list(&list, user_id) {
        return Err(CoreError::Forbidden(
            "You do not have permission to edit this list".to_string(),
        ));
    }
    Ok(list)
}

pub async fn viewable_list(
    db: &dyn DatabaseService,
    user_id: UserId,
    list_id: Uuid,
) -> CoreResult<ShoppingList> {
    let list = db.get_shopping_list(list_id).await?;
    if !can_view_list(&list, user_id) {
        return Err(CoreError::Forbidden(
            "You do not have access to this list".to_string(),
        ));
    }
    Ok(list)
}
