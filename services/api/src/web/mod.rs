pub mod lists;
pub mod middleware;
pub mod protocol;
pub mod purchases;
pub mod rest;
pub mod state;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use middleware::require_auth;
pub use rest::ApiDoc;
use state::AppState;

/// Builds the full application router: the authenticated REST routes, CORS,
/// request tracing, and the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.cors_allowed_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let protected_routes = Router::new()
        .route(
            "/lists/{list_id}/items/from-recipe",
            post(lists::add_recipe_to_list_handler),
        )
        .route("/lists/{list_id}/items", post(lists::add_item_handler))
        .route(
            "/lists/{list_id}/items/{item_id}",
            patch(lists::check_item_handler),
        )
        .route(
            "/lists/{list_id}/purchases",
            post(purchases::record_purchase_handler).get(purchases::list_purchases_handler),
        )
        .route(
            "/purchases/{purchase_id}",
            get(purchases::get_purchase_handler).put(purchases::update_purchase_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
