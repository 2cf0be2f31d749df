pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;

use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use handlers::general::{health_handler, root_handler};
use middleware::require_database;
use openapi::ApiDoc;
use routes::api_routes;
use state::AppState;

/// Full HTTP surface: landing page, health, `/api` behind the database gate, and Swagger UI.
pub fn app(state: AppState) -> Router {
    let api = api_routes().route_layer(from_fn_with_state(state.clone(), require_database));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api", api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
