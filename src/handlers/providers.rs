// src/handlers/providers.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    models::{ProviderEarnings, ServiceProvider, UpdateProviderRequest},
    response::ApiResponse,
    services::provider,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// The requesting provider's profile
#[utoipa::path(
    get,
    path = "/api/providers/me",
    responses(
        (status = 200, description = "Provider profile", body = ServiceProvider),
        (status = 403, description = "Providers only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn my_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ServiceProvider>> {
    Ok(ApiResponse::ok(provider::me(&state, &auth).await?))
}

#[utoipa::path(
    put,
    path = "/api/providers/me",
    request_body = UpdateProviderRequest,
    responses(
        (status = 200, description = "Profile updated", body = ServiceProvider),
        (status = 403, description = "Providers only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn update_my_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateProviderRequest>,
) -> AppResult<ApiResponse<ServiceProvider>> {
    Ok(ApiResponse::ok(provider::update_me(&state, &auth, body).await?))
}

/// Earned totals and amounts still pending settlement
#[utoipa::path(
    get,
    path = "/api/providers/me/earnings",
    responses(
        (status = 200, description = "Earnings summary", body = ProviderEarnings),
        (status = 403, description = "Providers only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Providers"
)]
pub async fn my_earnings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProviderEarnings>> {
    Ok(ApiResponse::ok(provider::earnings(&state, &auth).await?))
}

/// Public provider profile
#[utoipa::path(
    get,
    path = "/api/providers/{id}",
    params(("id" = Uuid, Path, description = "Service provider ID")),
    responses(
        (status = 200, description = "Provider profile", body = ServiceProvider),
        (status = 404, description = "Provider not found"),
    ),
    tag = "Providers"
)]
pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<ServiceProvider>> {
    Ok(ApiResponse::ok(provider::get(&state, id).await?))
}
