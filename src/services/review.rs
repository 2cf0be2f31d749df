// src/services/review.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::*,
    services::pricing::money,
    state::AppState,
};
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

pub async fn create(
    state: &AppState,
    auth: &AuthUser,
    req: CreateReviewRequest,
) -> AppResult<Review> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::Validation("Rating must be between 1 and 5".to_string()));
    }

    let booking = state
        .store
        .find_booking(req.booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.customer_id != auth.id {
        return Err(AppError::Forbidden(
            "Only the customer of this booking can review it".to_string(),
        ));
    }
    if booking.status != BookingStatus::Completed {
        return Err(AppError::Validation(
            "Only completed bookings can be reviewed".to_string(),
        ));
    }

    let review = Review {
        id: Uuid::new_v4(),
        booking_id: booking.id,
        customer_id: booking.customer_id,
        service_provider_id: booking.service_provider_id,
        service_listing_id: booking.service_listing_id,
        rating: req.rating,
        comment: req.comment.filter(|c| !c.trim().is_empty()),
        created_at: Utc::now(),
    };
    state.store.insert_review(&review).await
}

pub async fn for_listing(state: &AppState, listing_id: Uuid) -> AppResult<ListingReviews> {
    let reviews = state.store.list_reviews_for_listing(listing_id).await?;
    Ok(ListingReviews {
        listing_id,
        average_rating: average(&reviews),
        count: reviews.len(),
        reviews,
    })
}

fn average(reviews: &[Review]) -> Decimal {
    if reviews.is_empty() {
        return Decimal::ZERO;
    }
    let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    money(Decimal::from(total) / Decimal::from(reviews.len()))
}
