// src/handlers/feedback.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    models::{
        Complaint, ComplaintQuery, CreateComplaintRequest, CreateReviewRequest, ListingReviews,
        Review, UpdateComplaintRequest,
    },
    response::ApiResponse,
    services::{complaint, review},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

// ─── Complaints ───────────────────────────────────────────────────────────────

/// File a complaint about one of your bookings
#[utoipa::path(
    post,
    path = "/api/complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint filed", body = Complaint),
        (status = 403, description = "Not the booking's customer"),
        (status = 409, description = "Booking already has a complaint"),
    ),
    security(("bearer_auth" = [])),
    tag = "Complaints"
)]
pub async fn create_complaint(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateComplaintRequest>,
) -> AppResult<ApiResponse<Complaint>> {
    Ok(ApiResponse::created(complaint::create(&state, &auth, body).await?))
}

#[utoipa::path(
    get,
    path = "/api/complaints/customer",
    responses((status = 200, description = "The customer's complaints", body = [Complaint])),
    security(("bearer_auth" = [])),
    tag = "Complaints"
)]
pub async fn customer_complaints(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Complaint>>> {
    Ok(ApiResponse::ok(complaint::list_for_customer(&state, &auth).await?))
}

#[utoipa::path(
    get,
    path = "/api/complaints",
    params(ComplaintQuery),
    responses(
        (status = 200, description = "All complaints", body = [Complaint]),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Complaints"
)]
pub async fn list_complaints(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ComplaintQuery>,
) -> AppResult<ApiResponse<Vec<Complaint>>> {
    Ok(ApiResponse::ok(complaint::list(&state, &auth, query).await?))
}

#[utoipa::path(
    put,
    path = "/api/complaints/{id}",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = UpdateComplaintRequest,
    responses(
        (status = 200, description = "Complaint updated", body = Complaint),
        (status = 400, description = "Closed complaints cannot be reopened"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Complaints"
)]
pub async fn update_complaint(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateComplaintRequest>,
) -> AppResult<ApiResponse<Complaint>> {
    Ok(ApiResponse::ok(complaint::update(&state, &auth, id, body).await?))
}

// ─── Reviews ──────────────────────────────────────────────────────────────────

/// Review a completed booking
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review saved", body = Review),
        (status = 400, description = "Rating out of range or booking not completed"),
        (status = 409, description = "Booking already reviewed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateReviewRequest>,
) -> AppResult<ApiResponse<Review>> {
    Ok(ApiResponse::created(review::create(&state, &auth, body).await?))
}

#[utoipa::path(
    get,
    path = "/api/reviews/listing/{listing_id}",
    params(("listing_id" = Uuid, Path, description = "Listing ID")),
    responses((status = 200, description = "Reviews and average rating", body = ListingReviews)),
    tag = "Reviews"
)]
pub async fn listing_reviews(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> AppResult<ApiResponse<ListingReviews>> {
    Ok(ApiResponse::ok(review::for_listing(&state, listing_id).await?))
}
