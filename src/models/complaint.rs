use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ─── Complaint ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "complaint_status", rename_all = "snake_case")]
pub enum ComplaintStatus {
    Open,
    #[serde(rename = "Under Review")]
    UnderReview,
    Resolved,
    Closed,
}

impl ComplaintStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, ComplaintStatus::Resolved | ComplaintStatus::Closed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub service_provider_id: Uuid,
    pub subject: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub resolution: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub booking_id: Uuid,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateComplaintRequest {
    pub status: ComplaintStatus,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComplaintQuery {
    pub status: Option<ComplaintStatus>,
}

// ─── Review ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub service_provider_id: Uuid,
    pub service_listing_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingReviews {
    pub listing_id: Uuid,
    pub average_rating: Decimal,
    pub count: usize,
    pub reviews: Vec<Review>,
}
