use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "verification_status", rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub verification_status: VerificationStatus,
    /// Per-provider override of the platform commission percentage
    pub commission_rate: Option<Decimal>,
    pub total_earnings: Decimal,
    pub total_commission_paid: Decimal,
    pub category_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProviderRequest {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub category_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyProviderRequest {
    pub status: VerificationStatus,
    pub commission_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProviderQuery {
    pub status: Option<VerificationStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEarnings {
    pub provider_id: Uuid,
    pub total_earnings: Decimal,
    pub total_commission_paid: Decimal,
    /// Provider share of completed payments not yet transferred
    pub pending_payout: Decimal,
    /// Commission on completed payments not yet collected
    pub pending_commission: Decimal,
    pub completed_bookings: i64,
}
