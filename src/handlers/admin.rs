// src/handlers/admin.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    models::{
        Dashboard, PageQuery, ProviderQuery, ServiceProvider, Settings, UpdateSettingsRequest,
        UpdateUserStatusRequest, User, UserQuery, VerifyProviderRequest,
    },
    response::ApiResponse,
    services::{admin, provider, settings},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

/// Counts, financial totals, last week's revenue and recent bookings
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = Dashboard),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Dashboard>> {
    Ok(ApiResponse::ok(admin::dashboard(&state, &auth).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserQuery, PageQuery),
    responses(
        (status = 200, description = "Users, newest first", body = [User]),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<User>>> {
    let (users, pagination) = admin::list_users(&state, &auth, query, page).await?;
    Ok(ApiResponse::paginated(users, pagination))
}

/// Activate or deactivate an account
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/status",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Cannot deactivate yourself"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_user_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserStatusRequest>,
) -> AppResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(admin::set_user_status(&state, &auth, id, body).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/providers",
    params(ProviderQuery),
    responses(
        (status = 200, description = "Service providers", body = [ServiceProvider]),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_providers(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ProviderQuery>,
) -> AppResult<ApiResponse<Vec<ServiceProvider>>> {
    Ok(ApiResponse::ok(provider::list(&state, &auth, query).await?))
}

/// Set verification status and an optional commission override
#[utoipa::path(
    put,
    path = "/api/admin/providers/{id}/verify",
    params(("id" = Uuid, Path, description = "Service provider ID")),
    request_body = VerifyProviderRequest,
    responses(
        (status = 200, description = "Provider updated", body = ServiceProvider),
        (status = 400, description = "Rate out of range"),
        (status = 404, description = "Provider not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn verify_provider(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<VerifyProviderRequest>,
) -> AppResult<ApiResponse<ServiceProvider>> {
    Ok(ApiResponse::ok(provider::verify(&state, &auth, id, body).await?))
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Platform settings", body = Settings)),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_settings(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Settings>> {
    Ok(ApiResponse::ok(settings::current(&state).await?))
}

/// Replace the supplied sections; `version` must match the stored one
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = Settings),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Stale version"),
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateSettingsRequest>,
) -> AppResult<ApiResponse<Settings>> {
    Ok(ApiResponse::ok(settings::update(&state, &auth, body).await?))
}
