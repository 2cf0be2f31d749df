// src/handlers/bookings.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    models::{Booking, CreateBookingRequest, UpdateBookingStatusRequest},
    response::ApiResponse,
    services::booking,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// Book a service listing
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 400, description = "Date in the past or provider not verified"),
        (status = 404, description = "Listing not found or inactive"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn create_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateBookingRequest>,
) -> AppResult<ApiResponse<Booking>> {
    Ok(ApiResponse::created(booking::create(&state, &auth, body).await?))
}

#[utoipa::path(
    get,
    path = "/api/bookings/customer",
    responses((status = 200, description = "The customer's bookings", body = [Booking])),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn customer_bookings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Booking>>> {
    Ok(ApiResponse::ok(booking::list_for_customer(&state, &auth).await?))
}

#[utoipa::path(
    get,
    path = "/api/bookings/provider",
    responses(
        (status = 200, description = "The provider's bookings", body = [Booking]),
        (status = 403, description = "Providers only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn provider_bookings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Booking>>> {
    Ok(ApiResponse::ok(booking::list_for_provider(&state, &auth).await?))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 403, description = "Not a party to this booking"),
        (status = 404, description = "Booking not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn get_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Booking>> {
    Ok(ApiResponse::ok(booking::get(&state, &auth, id).await?))
}

/// Move a booking along its lifecycle
#[utoipa::path(
    put,
    path = "/api/bookings/{id}/status",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Booking),
        (status = 400, description = "Illegal transition"),
        (status = 403, description = "Not permitted for this booking"),
        (status = 409, description = "Booking changed concurrently"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn update_booking_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBookingStatusRequest>,
) -> AppResult<ApiResponse<Booking>> {
    Ok(ApiResponse::ok(booking::update_status(&state, &auth, id, body).await?))
}
