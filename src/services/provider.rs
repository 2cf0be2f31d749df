// src/services/provider.rs

use crate::{
    auth::{AuthUser, require_admin, require_provider},
    errors::{AppError, AppResult},
    models::*,
    services::pricing::PricingService,
    state::AppState,
};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

pub async fn get(state: &AppState, id: Uuid) -> AppResult<ServiceProvider> {
    state
        .store
        .find_provider(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service provider not found".to_string()))
}

pub async fn me(state: &AppState, auth: &AuthUser) -> AppResult<ServiceProvider> {
    get(state, require_provider(auth)?).await
}

pub async fn update_me(
    state: &AppState,
    auth: &AuthUser,
    req: UpdateProviderRequest,
) -> AppResult<ServiceProvider> {
    let mut provider = me(state, auth).await?;

    if let Some(name) = req.business_name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Business name cannot be empty".to_string()));
        }
        provider.business_name = name.to_string();
    }
    if let Some(description) = req.description {
        provider.description = Some(description);
    }
    if let Some(category_ids) = req.category_ids {
        for id in &category_ids {
            if state.store.find_category(*id).await?.is_none() {
                return Err(AppError::NotFound(format!("Category {id} not found")));
            }
        }
        provider.category_ids = category_ids;
    }

    state.store.save_provider(&provider).await
}

/// Running totals plus what is still owed on completed payments.
pub async fn earnings(state: &AppState, auth: &AuthUser) -> AppResult<ProviderEarnings> {
    let provider = me(state, auth).await?;

    let payments = state.store.list_payments_for_provider(provider.id).await?;
    let pending_payout: Decimal = payments
        .iter()
        .filter(|p| {
            p.payment_status == PaymentStatus::Completed
                && p.provider_transfer_status != TransferStatus::Completed
        })
        .map(|p| p.provider_amount)
        .sum();

    let pending_commission: Decimal = state
        .store
        .list_commissions_for_provider(provider.id)
        .await?
        .iter()
        .filter(|c| c.status == CommissionStatus::Pending)
        .map(|c| c.amount)
        .sum();

    let completed_bookings = state
        .store
        .list_bookings_for_provider(provider.id)
        .await?
        .iter()
        .filter(|b| b.status == BookingStatus::Completed)
        .count() as i64;

    Ok(ProviderEarnings {
        provider_id: provider.id,
        total_earnings: provider.total_earnings,
        total_commission_paid: provider.total_commission_paid,
        pending_payout,
        pending_commission,
        completed_bookings,
    })
}

// ─── Admin ────────────────────────────────────────────────────────────────────

pub async fn list(
    state: &AppState,
    auth: &AuthUser,
    query: ProviderQuery,
) -> AppResult<Vec<ServiceProvider>> {
    require_admin(auth)?;
    state.store.list_providers(query.status).await
}

pub async fn verify(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    req: VerifyProviderRequest,
) -> AppResult<ServiceProvider> {
    require_admin(auth)?;
    let mut provider = get(state, id).await?;

    if let Some(rate) = req.commission_rate {
        PricingService::validate_rate(rate)?;
        provider.commission_rate = Some(rate);
    }
    provider.verification_status = req.status;

    let provider = state.store.save_provider(&provider).await?;
    info!(
        "Provider {} marked {:?} by admin {}",
        provider.id, provider.verification_status, auth.id
    );
    Ok(provider)
}
