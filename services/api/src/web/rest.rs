//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the mapping from
//! core errors to HTTP responses shared by every REST handler.

use crate::web::{lists, protocol::*, purchases};
use axum::{http::StatusCode, Json};
use pantry_core::CoreError;
use tracing::{error, warn};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        lists::add_recipe_to_list_handler,
        lists::add_item_handler,
        lists::check_item_handler,
        purchases::record_purchase_handler,
        purchases::list_purchases_handler,
        purchases::get_purchase_handler,
        purchases::update_purchase_handler,
    ),
    components(
        schemas(
            RecipeToListRequest,
            IngredientSelectionRequest,
            RecipeToListResponse,
            AddItemRequest,
            CheckItemRequest,
            ItemResponse,
            ItemEnvelope,
            RecordPurchaseRequest,
            UpdatePurchaseRequest,
            PurchaseItemEditRequest,
            PurchaseResponse,
            PurchaseItemResponse,
            PurchaseEnvelope,
            PurchaseListResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Pantry API", description = "Shopping lists, recipe conversion and the purchase ledger.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

pub type HttpError = (StatusCode, Json<ErrorResponse>);

fn http_error(status: StatusCode, message: String, field: Option<String>) -> HttpError {
    (
        status,
        Json(ErrorResponse {
            error: message,
            field,
        }),
    )
}

/// Maps a core error onto its status code. Unexpected persistence failures are
/// logged and reported with a generic message.
pub fn error_response(err: CoreError) -> HttpError {
    match err {
        CoreError::Unauthorized => {
            http_error(StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None)
        }
        CoreError::Forbidden(message) => {
            warn!("Forbidden: {}", message);
            http_error(StatusCode::FORBIDDEN, message, None)
        }
        CoreError::NotFound(message) => http_error(StatusCode::NOT_FOUND, message, None),
        CoreError::Validation { field, message } => {
            http_error(StatusCode::BAD_REQUEST, message, Some(field))
        }
        CoreError::Conflict(message) => http_error(StatusCode::CONFLICT, message, None),
        CoreError::Port(e) => {
            error!("Unexpected persistence failure: {:?}", e);
            http_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::PortError;

    #[test]
    fn validation_errors_carry_the_field() {
        let (status, Json(body)) = error_response(CoreError::validation("servings", "too few"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.field.as_deref(), Some("servings"));
        assert_eq!(body.error, "too few");
    }

    #[test]
    fn persistence_details_are_not_leaked() {
        let (status, Json(body)) =
            error_response(CoreError::Port(PortError::Unexpected("connection reset".to_string())));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }
}
