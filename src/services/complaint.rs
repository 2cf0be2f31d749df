// src/services/complaint.rs

use crate::{
    auth::{AuthUser, require_admin},
    errors::{AppError, AppResult},
    models::*,
    state::AppState,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

pub async fn create(
    state: &AppState,
    auth: &AuthUser,
    req: CreateComplaintRequest,
) -> AppResult<Complaint> {
    let subject = req.subject.trim().to_string();
    let description = req.description.trim().to_string();
    if subject.is_empty() || description.is_empty() {
        return Err(AppError::Validation(
            "Subject and description are required".to_string(),
        ));
    }

    let booking = state
        .store
        .find_booking(req.booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    // filing is the customer's own act, admins included
    if booking.customer_id != auth.id {
        return Err(AppError::Forbidden(
            "Only the customer of this booking can file a complaint".to_string(),
        ));
    }

    if state
        .store
        .find_complaint_by_booking(booking.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "A complaint has already been filed for this booking".to_string(),
        ));
    }

    let now = Utc::now();
    let complaint = Complaint {
        id: Uuid::new_v4(),
        booking_id: booking.id,
        customer_id: booking.customer_id,
        service_provider_id: booking.service_provider_id,
        subject,
        description,
        status: ComplaintStatus::Open,
        resolution: None,
        resolved_by: None,
        resolved_at: None,
        created_at: now,
        updated_at: now,
    };

    let complaint = state.store.insert_complaint(&complaint).await?;
    info!("Complaint {} filed for booking {}", complaint.id, booking.id);
    Ok(complaint)
}

pub async fn list_for_customer(state: &AppState, auth: &AuthUser) -> AppResult<Vec<Complaint>> {
    state.store.list_complaints_for_customer(auth.id).await
}

pub async fn list(
    state: &AppState,
    auth: &AuthUser,
    query: ComplaintQuery,
) -> AppResult<Vec<Complaint>> {
    require_admin(auth)?;
    state.store.list_complaints(query.status).await
}

pub async fn update(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    req: UpdateComplaintRequest,
) -> AppResult<Complaint> {
    require_admin(auth)?;
    let mut complaint = state
        .store
        .find_complaint(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Complaint not found".to_string()))?;

    if complaint.status == ComplaintStatus::Closed && req.status != ComplaintStatus::Closed {
        return Err(AppError::Validation("A closed complaint cannot be reopened".to_string()));
    }

    if let Some(resolution) = req.resolution {
        complaint.resolution = Some(resolution);
    }
    if req.status.is_settled() && !complaint.status.is_settled() {
        complaint.resolved_by = Some(auth.id);
        complaint.resolved_at = Some(Utc::now());
    } else if !req.status.is_settled() {
        complaint.resolved_by = None;
        complaint.resolved_at = None;
    }
    complaint.status = req.status;

    let complaint = state.store.save_complaint(&complaint).await?;
    info!("Complaint {} set to {:?} by {}", complaint.id, complaint.status, auth.id);
    Ok(complaint)
}
