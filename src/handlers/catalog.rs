// src/handlers/catalog.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    models::{
        CreateCategoryRequest, CreateListingRequest, ListingFilter, ServiceCategory,
        ServiceListing, UpdateCategoryRequest, UpdateListingRequest,
    },
    response::ApiResponse,
    services::catalog,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

// ─── Categories ───────────────────────────────────────────────────────────────

/// List service categories (admins also see inactive ones)
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Categories", body = [ServiceCategory])),
    tag = "Categories"
)]
pub async fn list_categories(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ServiceCategory>>> {
    let categories = catalog::list_categories(&state, auth.as_ref()).await?;
    Ok(ApiResponse::ok(categories))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = ServiceCategory),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<ServiceCategory>> {
    Ok(ApiResponse::ok(catalog::get_category(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ServiceCategory),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Name already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> AppResult<ApiResponse<ServiceCategory>> {
    Ok(ApiResponse::created(catalog::create_category(&state, &auth, body).await?))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ServiceCategory),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryRequest>,
) -> AppResult<ApiResponse<ServiceCategory>> {
    Ok(ApiResponse::ok(catalog::update_category(&state, &auth, id, body).await?))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has listings"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    catalog::delete_category(&state, &auth, id).await?;
    Ok(ApiResponse::message("Category deleted"))
}

// ─── Listings ─────────────────────────────────────────────────────────────────

/// Bookable listings, optionally filtered by category or provider
#[utoipa::path(
    get,
    path = "/api/listings",
    params(ListingFilter),
    responses((status = 200, description = "Active listings of verified providers", body = [ServiceListing])),
    tag = "Listings"
)]
pub async fn list_listings(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> AppResult<ApiResponse<Vec<ServiceListing>>> {
    Ok(ApiResponse::ok(catalog::list_public(&state, filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing", body = ServiceListing),
        (status = 404, description = "Listing not found"),
    ),
    tag = "Listings"
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<ServiceListing>> {
    Ok(ApiResponse::ok(catalog::get_listing(&state, id).await?))
}

/// The requesting provider's own listings, inactive included
#[utoipa::path(
    get,
    path = "/api/listings/mine",
    responses(
        (status = 200, description = "Own listings", body = [ServiceListing]),
        (status = 403, description = "Providers only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn my_listings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ServiceListing>>> {
    Ok(ApiResponse::ok(catalog::list_mine(&state, &auth).await?))
}

/// Create a listing; the commission split is computed server-side
#[utoipa::path(
    post,
    path = "/api/listings",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created", body = ServiceListing),
        (status = 400, description = "Invalid price or inactive category"),
        (status = 403, description = "Providers only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn create_listing(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateListingRequest>,
) -> AppResult<ApiResponse<ServiceListing>> {
    Ok(ApiResponse::created(catalog::create_listing(&state, &auth, body).await?))
}

#[utoipa::path(
    put,
    path = "/api/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Listing updated", body = ServiceListing),
        (status = 403, description = "Not the owning provider"),
        (status = 404, description = "Listing not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn update_listing(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateListingRequest>,
) -> AppResult<ApiResponse<ServiceListing>> {
    Ok(ApiResponse::ok(catalog::update_listing(&state, &auth, id, body).await?))
}

/// Deactivate a listing; existing bookings are unaffected
#[utoipa::path(
    delete,
    path = "/api/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing deactivated", body = ServiceListing),
        (status = 403, description = "Not the owning provider"),
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn deactivate_listing(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<ServiceListing>> {
    let listing = catalog::deactivate_listing(&state, &auth, id).await?;
    Ok(ApiResponse::ok(listing).with_message("Listing deactivated"))
}
