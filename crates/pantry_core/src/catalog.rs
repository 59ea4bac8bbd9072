//! crates/pantry_core/src/catalog.rs
//!
//! Checks on the unit and store ids a caller attaches to list items.

use uuid::Uuid;

use crate::access::accessible;
use crate::domain::{Store, Unit, UserId};
use crate::error::{CoreError, CoreResult};
use crate::ports::{DatabaseService, PortError};

/// Loads a unit chosen by the caller. An unknown id is a validation error on `field`.
pub async fn known_unit(
    db: &dyn DatabaseService,
    unit_id: Uuid,
    field: impl Into<String>,
) -> CoreResult<Unit> {
    match db.get_unit(unit_id).await {
        Ok(unit) => Ok(unit),
        Err(PortError::NotFound(_)) => Err(CoreError::validation(
            field,
            format!("Unit {unit_id} does not exist"),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Loads a store chosen by the caller and checks that the user may shop there.
pub async fn usable_store(
    db: &dyn DatabaseService,
    user_id: UserId,
    store_id: Uuid,
    field: impl Into<String>,
) -> CoreResult<Store> {
    let store = match db.get_store(store_id).await {
        Ok(store) => store,
        Err(PortError::NotFound(_)) => {
            return Err(CoreError::validation(
                field,
                format!("Store {store_id} does not exist"),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    if !accessible(&store, user_id) {
        return Err(CoreError::Forbidden(format!(
            "You do not have access to store '{}'",
            store.name
        )));
    }
    Ok(store)
}
