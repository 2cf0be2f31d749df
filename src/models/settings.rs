use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    pub site_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub currency: String,
    pub maintenance_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSettings {
    /// Platform commission percentage applied when a provider has no override
    pub default_rate: Decimal,
    pub minimum_payout: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email_on_booking: bool,
    pub email_on_payment: bool,
    pub email_on_complaint: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub session_timeout_hours: i64,
    pub password_min_length: u32,
    pub require_provider_verification: bool,
}

/// Process-wide configuration record. There is exactly one row; every update
/// must present the current `version` and bumps it on success.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(skip)]
    pub id: i32,
    #[sqlx(json)]
    pub general: GeneralSettings,
    #[sqlx(json)]
    pub commission: CommissionSettings,
    #[sqlx(json)]
    pub notifications: NotificationSettings,
    #[sqlx(json)]
    pub security: SecuritySettings,
    pub version: i64,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl Settings {
    pub const SINGLETON_ID: i32 = 1;

    pub fn defaults(
        default_commission_rate: Decimal,
        currency: &str,
        session_timeout_hours: i64,
    ) -> Self {
        Self {
            id: Self::SINGLETON_ID,
            general: GeneralSettings {
                site_name: "Fixly".to_string(),
                contact_email: None,
                contact_phone: None,
                currency: currency.to_string(),
                maintenance_mode: false,
            },
            commission: CommissionSettings {
                default_rate: default_commission_rate,
                minimum_payout: Decimal::ZERO,
            },
            notifications: NotificationSettings {
                email_on_booking: true,
                email_on_payment: true,
                email_on_complaint: true,
            },
            security: SecuritySettings {
                session_timeout_hours,
                password_min_length: 6,
                require_provider_verification: true,
            },
            version: 1,
            updated_by: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    /// The version the caller last read; stale versions are rejected
    pub version: i64,
    pub general: Option<GeneralSettings>,
    pub commission: Option<CommissionSettings>,
    pub notifications: Option<NotificationSettings>,
    pub security: Option<SecuritySettings>,
}
