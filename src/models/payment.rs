use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::Booking;

// ─── Payment ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Settlement state of one leg of a payment (platform commission or provider payout).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "transfer_status", rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub service_provider_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub transaction_id: String,
    pub gateway_order_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub commission_amount: Decimal,
    pub provider_amount: Decimal,
    pub commission_transfer_status: TransferStatus,
    pub provider_transfer_status: TransferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub booking_id: Uuid,
    pub payment_method: String,
    pub transaction_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub booking_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrderResponse {
    pub order_id: String,
    /// Amount in the currency's minor unit, as the gateway expects it
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub booking_id: Uuid,
}

/// Gateway order issued for a booking; verification only accepts an order
/// that was created for the booking being paid.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct GatewayOrder {
    pub order_id: String,
    pub booking_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub booking_id: Uuid,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: Option<PaymentStatus>,
    pub commission_transfer_status: Option<TransferStatus>,
    pub provider_transfer_status: Option<TransferStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub commission: Commission,
    pub booking: Booking,
}

// ─── Commission ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "commission_status", rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Collected,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub booking_id: Uuid,
    pub service_provider_id: Uuid,
    pub amount: Decimal,
    /// Percentage of the booking total, e.g. 10 means 10%
    pub rate: Decimal,
    pub status: CommissionStatus,
    pub collection_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCommissionRequest {
    pub status: CommissionStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommissionQuery {
    pub status: Option<CommissionStatus>,
}

// ─── Admin Earnings ───────────────────────────────────────────────────────────

/// Daily rollup of collected commission, keyed by the day of collection.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminEarnings {
    pub id: Uuid,
    pub date: NaiveDate,
    pub total_commission_earned: Decimal,
    pub commission_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EarningsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
