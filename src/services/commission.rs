// src/services/commission.rs

use crate::{
    auth::{AuthUser, Owner, authorize, require_admin},
    errors::{AppError, AppResult},
    models::*,
    state::AppState,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

pub async fn list(
    state: &AppState,
    auth: &AuthUser,
    query: CommissionQuery,
    page: PageQuery,
) -> AppResult<(Vec<Commission>, Pagination)> {
    require_admin(auth)?;
    let (commissions, total) = state.store.list_commissions(query.status, page).await?;
    Ok((commissions, page.pagination(total)))
}

pub async fn list_for_provider(
    state: &AppState,
    auth: &AuthUser,
    provider_id: Uuid,
) -> AppResult<Vec<Commission>> {
    authorize(auth, &[Owner::Provider(provider_id)], &[])?;
    state.store.list_commissions_for_provider(provider_id).await
}

/// `Pending` may become `Collected` or `Refunded`; both are final.
/// Repeating the current status is a no-op.
pub async fn update(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    req: UpdateCommissionRequest,
) -> AppResult<Commission> {
    require_admin(auth)?;
    let commission = state
        .store
        .find_commission(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Commission not found".to_string()))?;

    if commission.status == req.status {
        return Ok(commission);
    }
    if commission.status != CommissionStatus::Pending {
        return Err(AppError::Validation(format!(
            "A {:?} commission cannot change status",
            commission.status
        )));
    }

    let notes = req.notes.as_deref();
    let updated = match req.status {
        CommissionStatus::Collected => {
            let collected = state
                .store
                .collect_commission(id, Utc::now(), notes)
                .await?;
            if let Some(c) = &collected {
                info!(
                    "Commission {} of {} collected from provider {}",
                    c.id, c.amount, c.service_provider_id
                );
            }
            collected
        }
        CommissionStatus::Refunded => {
            let refunded = state.store.refund_commission(id, notes).await?;
            if let Some(c) = &refunded {
                info!("Commission {} refunded", c.id);
            }
            refunded
        }
        CommissionStatus::Pending => {
            return Err(AppError::Validation(
                "A commission cannot be moved back to pending".to_string(),
            ));
        }
    };

    // a concurrent update got there first; report what is stored now
    match updated {
        Some(commission) => Ok(commission),
        None => state
            .store
            .find_commission(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Commission not found".to_string())),
    }
}

pub async fn earnings(
    state: &AppState,
    auth: &AuthUser,
    query: EarningsQuery,
) -> AppResult<Vec<AdminEarnings>> {
    require_admin(auth)?;
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(AppError::Validation(
                "startDate must not be after endDate".to_string(),
            ));
        }
    }
    state
        .store
        .list_admin_earnings(query.start_date, query.end_date)
        .await
}
