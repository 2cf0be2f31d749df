use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::Booking;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "report_type", rename_all = "snake_case")]
pub enum ReportType {
    Revenue,
    Bookings,
    Providers,
    Customers,
    Complaints,
    Custom,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "time_frame", rename_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub report_type: ReportType,
    pub title: String,
    pub time_frame: TimeFrame,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub total_revenue: Decimal,
    pub total_commission: Decimal,
    pub generated_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub report_type: ReportType,
    pub title: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub time_frame: TimeFrame,
}

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    #[serde(default)]
    pub time_frame: TimeFrame,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

// ─── Aggregated views ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_revenue: Decimal,
    pub total_commission: Decimal,
    pub total_provider_earnings: Decimal,
    pub total_payments: usize,
    pub average_revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    pub period: String,
    pub revenue: Decimal,
    pub commission: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub summary: RevenueSummary,
    pub chart_data: Vec<RevenuePoint>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountPoint {
    pub period: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdownReport {
    pub total: usize,
    /// Count per status name
    #[schema(value_type = Object)]
    pub by_status: std::collections::BTreeMap<String, usize>,
    pub total_value: Decimal,
    pub chart_data: Vec<CountPoint>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProvider {
    pub provider_id: Uuid,
    pub business_name: String,
    pub total_earnings: Decimal,
    pub total_commission_paid: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersReport {
    pub total: usize,
    #[schema(value_type = Object)]
    pub by_status: std::collections::BTreeMap<String, usize>,
    pub top_providers: Vec<TopProvider>,
    pub chart_data: Vec<CountPoint>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomersReport {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub chart_data: Vec<CountPoint>,
}

// ─── Admin Dashboard ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_customers: i64,
    pub total_providers: i64,
    pub pending_providers: i64,
    pub active_listings: i64,
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub completed_bookings: i64,
    pub open_complaints: i64,
}

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFinancials {
    pub total_revenue: Decimal,
    pub total_commission: Decimal,
    pub collected_commission: Decimal,
    pub pending_commission: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub counts: DashboardCounts,
    pub financials: DashboardFinancials,
    pub revenue_chart: Vec<RevenuePoint>,
    pub recent_bookings: Vec<Booking>,
}
