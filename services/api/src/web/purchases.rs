//! services/api/src/web/purchases.rs
//!
//! Purchase ledger endpoints.

use crate::web::{
    protocol::{
        ErrorResponse, PurchaseEnvelope, PurchaseListResponse, PurchaseResponse,
        RecordPurchaseRequest, UpdatePurchaseRequest,
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
use pantry_core::purchases;
use std::sync::Arc;
use uuid::Uuid;

fn envelope(purchase: pantry_core::Purchase) -> Json<PurchaseEnvelope> {
    Json(PurchaseEnvelope {
        purchase: PurchaseResponse::from(purchase),
    })
}

/// Record a purchase from every checked item of the list.
#[utoipa::path(
    post,
    path = "/lists/{list_id}/purchases",
    request_body(content = RecordPurchaseRequest, description = "May be omitted entirely"),
    params(("list_id" = Uuid, Path, description = "Shopping list")),
    responses(
        (status = 201, description = "Purchase recorded", body = PurchaseEnvelope),
        (status = 400, description = "No checked items on the list", body = ErrorResponse),
        (status = 403, description = "No edit permission on the list", body = ErrorResponse),
        (status = 404, description = "List not found", body = ErrorResponse)
    )
)]
pub async fn record_purchase_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(list_id): Path<Uuid>,
    body: Option<Json<RecordPurchaseRequest>>,
) -> Result<impl IntoResponse, HttpError> {
    // No body at all means "now, no notes".
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let purchase = purchases::record_purchase(
        app_state.db.as_ref(),
        user_id,
        list_id,
        &req.into_domain(),
    )
    .await
    .map_err(error_response)?;

    Ok((StatusCode::CREATED, envelope(purchase)))
}

/// List the purchases recorded for a shopping list, newest first.
#[utoipa::path(
    get,
    path = "/lists/{list_id}/purchases",
    params(("list_id" = Uuid, Path, description = "Shopping list")),
    responses(
        (status = 200, description = "Purchases of the list", body = PurchaseListResponse),
        (status = 403, description = "No access to the list", body = ErrorResponse),
        (status = 404, description = "List not found", body = ErrorResponse)
    )
)]
pub async fn list_purchases_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(list_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let recorded = purchases::list_purchases(app_state.db.as_ref(), user_id, list_id)
        .await
        .map_err(error_response)?;

    Ok(Json(PurchaseListResponse {
        purchases: recorded.into_iter().map(PurchaseResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/purchases/{purchase_id}",
    params(("purchase_id" = Uuid, Path, description = "Purchase")),
    responses(
        (status = 200, description = "The purchase", body = PurchaseEnvelope),
        (status = 403, description = "No access to the purchase's list", body = ErrorResponse),
        (status = 404, description = "Purchase not found", body = ErrorResponse)
    )
)]
pub async fn get_purchase_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(purchase_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let purchase = purchases::get_purchase(app_state.db.as_ref(), user_id, purchase_id)
        .await
        .map_err(error_response)?;

    Ok(envelope(purchase))
}

/// Correct a recorded purchase. Subtotals and the total are recomputed.
#[utoipa::path(
    put,
    path = "/purchases/{purchase_id}",
    request_body = UpdatePurchaseRequest,
    params(("purchase_id" = Uuid, Path, description = "Purchase")),
    responses(
        (status = 200, description = "Purchase with recomputed totals", body = PurchaseEnvelope),
        (status = 400, description = "Negative quantity or price", body = ErrorResponse),
        (status = 403, description = "No edit permission on the purchase's list", body = ErrorResponse),
        (status = 404, description = "Purchase not found", body = ErrorResponse)
    )
)]
pub async fn update_purchase_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(purchase_id): Path<Uuid>,
    Json(req): Json<UpdatePurchaseRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let purchase = purchases::reconcile_purchase(
        app_state.db.as_ref(),
        user_id,
        purchase_id,
        &req.into_domain(),
    )
    .await
    .map_err(error_response)?;

    Ok(envelope(purchase))
}
