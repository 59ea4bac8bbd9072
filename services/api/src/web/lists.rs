//! services/api/src/web/lists.rs
//!
//! Shopping-list endpoints: recipe conversion, manual item adds and check-off.

use crate::web::{
    protocol::{
        AddItemRequest, CheckItemRequest, ErrorResponse, ItemEnvelope, ItemResponse,
        RecipeToListRequest, RecipeToListResponse,
    },
    rest::{error_response, HttpError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use pantry_core::{conversion, items};
use std::sync::Arc;
use uuid::Uuid;

/// Add the ingredients of a recipe to a shopping list.
///
/// Each ingredient is resolved to an article (explicit selection first, then the
/// recipe's default), scaled to the requested servings, and added unless the
/// list already carries that article.
#[utoipa::path(
    post,
    path = "/lists/{list_id}/items/from-recipe",
    request_body = RecipeToListRequest,
    params(("list_id" = Uuid, Path, description = "Target shopping list")),
    responses(
        (status = 201, description = "Recipe converted", body = RecipeToListResponse),
        (status = 400, description = "Invalid servings or no selectable article", body = ErrorResponse),
        (status = 401, description = "No session"),
        (status = 403, description = "No edit permission on the list, or no access to the recipe or an article", body = ErrorResponse),
        (status = 404, description = "List, recipe or article not found", body = ErrorResponse)
    )
)]
pub async fn add_recipe_to_list_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<RecipeToListRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let request = req.into_domain();
    let outcome = conversion::add_recipe_to_list(app_state.db.as_ref(), user_id, list_id, &request)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(RecipeToListResponse::from(outcome))))
}

/// Add a single article to a shopping list.
#[utoipa::path(
    post,
    path = "/lists/{list_id}/items",
    request_body = AddItemRequest,
    params(("list_id" = Uuid, Path, description = "Target shopping list")),
    responses(
        (status = 201, description = "Item added", body = ItemEnvelope),
        (status = 400, description = "Invalid quantity", body = ErrorResponse),
        (status = 403, description = "No edit permission or no access to the article", body = ErrorResponse),
        (status = 409, description = "The article is already on the list", body = ErrorResponse)
    )
)]
pub async fn add_item_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<AddItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let details = items::add_item(app_state.db.as_ref(), user_id, list_id, &req.into_domain())
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ItemEnvelope {
            item: ItemResponse::from(details),
        }),
    ))
}

/// Check an item off, or record what was actually bought and paid.
#[utoipa::path(
    patch,
    path = "/lists/{list_id}/items/{item_id}",
    request_body = CheckItemRequest,
    params(
        ("list_id" = Uuid, Path, description = "Shopping list"),
        ("item_id" = Uuid, Path, description = "Item on that list")
    ),
    responses(
        (status = 200, description = "Item updated", body = ItemEnvelope),
        (status = 400, description = "Purchased quantity or price out of range", body = ErrorResponse),
        (status = 403, description = "No edit permission on the list", body = ErrorResponse),
        (status = 404, description = "Item not on this list", body = ErrorResponse)
    )
)]
pub async fn check_item_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((list_id, item_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CheckItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let details = items::check_item(
        app_state.db.as_ref(),
        user_id,
        list_id,
        item_id,
        &req.into_domain(),
    )
    .await
    .map_err(error_response)?;

    Ok(Json(ItemEnvelope {
        item: ItemResponse::from(details),
    }))
}
