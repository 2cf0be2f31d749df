// src/services/booking.rs

use crate::{
    auth::{AuthUser, Owner, authorize, require_provider},
    errors::{AppError, AppResult},
    models::*,
    services::settings,
    state::AppState,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

pub async fn create(
    state: &AppState,
    auth: &AuthUser,
    req: CreateBookingRequest,
) -> AppResult<Booking> {
    authorize(auth, &[], &[UserRole::Customer])?;

    let listing = state
        .store
        .find_listing(req.service_listing_id)
        .await?
        .filter(|l| l.is_active)
        .ok_or_else(|| AppError::NotFound("Service listing not found or inactive".to_string()))?;

    let provider = state
        .store
        .find_provider(listing.service_provider_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service provider not found".to_string()))?;

    let settings = settings::current(state).await?;
    if settings.security.require_provider_verification
        && provider.verification_status != VerificationStatus::Verified
    {
        return Err(AppError::Validation(
            "This provider is not accepting bookings yet".to_string(),
        ));
    }

    let now = Utc::now();
    if req.service_date_time <= now {
        return Err(AppError::Validation(
            "Service date must be in the future".to_string(),
        ));
    }

    // The amounts are copied so later listing edits leave this booking alone
    let booking = Booking {
        id: Uuid::new_v4(),
        customer_id: auth.id,
        service_provider_id: listing.service_provider_id,
        service_listing_id: listing.id,
        service_date_time: req.service_date_time,
        special_instructions: req.special_instructions,
        total_amount: listing.service_price,
        commission_amount: listing.commission_amount,
        provider_earning: listing.provider_earning,
        status: BookingStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    let booking = state.store.insert_booking(&booking).await?;
    info!("Booking {} created for listing {}", booking.id, listing.id);
    Ok(booking)
}

pub async fn list_for_customer(state: &AppState, auth: &AuthUser) -> AppResult<Vec<Booking>> {
    state.store.list_bookings_for_customer(auth.id).await
}

pub async fn list_for_provider(state: &AppState, auth: &AuthUser) -> AppResult<Vec<Booking>> {
    let provider_id = require_provider(auth)?;
    state.store.list_bookings_for_provider(provider_id).await
}

/// Loads a booking the requester is a party to.
pub async fn get(state: &AppState, auth: &AuthUser, id: Uuid) -> AppResult<Booking> {
    let booking = state
        .store
        .find_booking(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    authorize(
        auth,
        &[
            Owner::User(booking.customer_id),
            Owner::Provider(booking.service_provider_id),
        ],
        &[],
    )?;
    Ok(booking)
}

pub async fn update_status(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    req: UpdateBookingStatusRequest,
) -> AppResult<Booking> {
    let booking = get(state, auth, id).await?;
    let next = req.status;

    if auth.role == UserRole::Customer && next != BookingStatus::Cancelled {
        return Err(AppError::Forbidden(
            "Customers can only cancel a booking".to_string(),
        ));
    }

    if !booking.status.can_transition_to(next) {
        return Err(AppError::Validation(format!(
            "Cannot change booking status from {:?} to {:?}",
            booking.status, next
        )));
    }

    let updated = state
        .store
        .transition_booking(booking.id, booking.status, next)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Booking was updated concurrently; reload and try again".to_string())
        })?;

    info!(
        "Booking {} moved {:?} -> {:?} by {}",
        updated.id, booking.status, updated.status, auth.id
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::catalog, test_support::TestApp};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn request(listing_id: Uuid) -> CreateBookingRequest {
        CreateBookingRequest {
            service_listing_id: listing_id,
            service_date_time: Utc::now() + Duration::days(2),
            special_instructions: Some("Ring twice".to_string()),
        }
    }

    #[tokio::test]
    async fn test_booking_snapshots_listing_split() {
        let app = TestApp::new();
        let pro = app.provider("Ravi", VerificationStatus::Verified).await;
        let (_, customer) = app.customer("Asha").await;
        let listing = app.listing(&pro.profile, dec!(200)).await;

        let booking = create(&app.state, &customer, request(listing.id)).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total_amount, dec!(200));
        assert_eq!(booking.commission_amount, dec!(20));
        assert_eq!(booking.provider_earning, dec!(180));

        // repricing the listing leaves the booking's figures untouched
        catalog::update_listing(
            &app.state,
            &pro.auth,
            listing.id,
            UpdateListingRequest {
                category_id: None,
                title: None,
                service_details: None,
                service_price: Some(dec!(999)),
                tags: None,
                is_active: None,
            },
        )
        .await
        .unwrap();
        let reloaded = get(&app.state, &customer, booking.id).await.unwrap();
        assert_eq!(reloaded.total_amount, dec!(200));
        assert_eq!(reloaded.commission_amount + reloaded.provider_earning, dec!(200));
    }

    #[tokio::test]
    async fn test_inactive_listing_is_not_found() {
        let app = TestApp::new();
        let pro = app.provider("Ravi", VerificationStatus::Verified).await;
        let (_, customer) = app.customer("Asha").await;
        let listing = app.listing(&pro.profile, dec!(200)).await;
        catalog::deactivate_listing(&app.state, &pro.auth, listing.id).await.unwrap();

        let result = create(&app.state, &customer, request(listing.id)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        let missing = create(&app.state, &customer, request(Uuid::new_v4())).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unverified_provider_is_not_bookable() {
        let app = TestApp::new();
        let pro = app.provider("New", VerificationStatus::Pending).await;
        let (_, customer) = app.customer("Asha").await;
        let listing = app.listing(&pro.profile, dec!(200)).await;

        let result = create(&app.state, &customer, request(listing.id)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_provider_walks_the_state_machine() {
        let app = TestApp::new();
        let pro = app.provider("Ravi", VerificationStatus::Verified).await;
        let (customer, _) = app.customer("Asha").await;
        let listing = app.listing(&pro.profile, dec!(200)).await;
        let booking = app.booking(&customer, &listing, Utc::now()).await;

        let status = |status| UpdateBookingStatusRequest { status };
        let confirmed = update_status(&app.state, &pro.auth, booking.id, status(BookingStatus::Confirmed))
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        let backwards = update_status(&app.state, &pro.auth, booking.id, status(BookingStatus::Pending)).await;
        assert!(matches!(backwards, Err(AppError::Validation(_))));

        update_status(&app.state, &pro.auth, booking.id, status(BookingStatus::Completed))
            .await
            .unwrap();
        let after_terminal =
            update_status(&app.state, &pro.auth, booking.id, status(BookingStatus::Cancelled)).await;
        assert!(matches!(after_terminal, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_customer_may_only_cancel_own_booking() {
        let app = TestApp::new();
        let pro = app.provider("Ravi", VerificationStatus::Verified).await;
        let (customer, customer_auth) = app.customer("Asha").await;
        let (_, stranger) = app.customer("Eve").await;
        let listing = app.listing(&pro.profile, dec!(200)).await;
        let booking = app.booking(&customer, &listing, Utc::now()).await;

        let confirm = update_status(
            &app.state,
            &customer_auth,
            booking.id,
            UpdateBookingStatusRequest { status: BookingStatus::Confirmed },
        )
        .await;
        assert!(matches!(confirm, Err(AppError::Forbidden(_))));

        let foreign = update_status(
            &app.state,
            &stranger,
            booking.id,
            UpdateBookingStatusRequest { status: BookingStatus::Cancelled },
        )
        .await;
        assert!(matches!(foreign, Err(AppError::Forbidden(_))));

        let cancelled = update_status(
            &app.state,
            &customer_auth,
            booking.id,
            UpdateBookingStatusRequest { status: BookingStatus::Cancelled },
        )
        .await
        .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
    }
}
