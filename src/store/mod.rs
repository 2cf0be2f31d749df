// src/store/mod.rs

//! Persistence boundary.
//!
//! Services talk to storage only through [`Store`]. Methods that move money
//! (`record_payment`, `credit_provider_transfer`, `collect_commission`) are
//! atomic and guarded so a repeated or concurrent call cannot double-count.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use crate::{errors::AppResult, models::*};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

pub use postgres::PgStore;

/// Inclusive time range used by report scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// From the first instant of `start` to the last instant of `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        Self {
            start: start.and_time(NaiveTime::MIN).and_utc(),
            end: end.and_time(end_of_day).and_utc(),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Which settlement leg of a payment a transfer status refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferLeg {
    Commission,
    Provider,
}

#[async_trait]
pub trait Store: Send + Sync {
    // ─── Health ───────────────────────────────────────────────────────────────

    /// Cheap connectivity flag checked before every API request.
    fn is_connected(&self) -> bool;
    async fn ping(&self) -> AppResult<()>;

    // ─── Users ────────────────────────────────────────────────────────────────

    /// Inserts the user, and the provider profile when given, in one transaction.
    async fn insert_user(&self, user: &User, provider: Option<&ServiceProvider>)
    -> AppResult<User>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_user_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;
    async fn save_user(&self, user: &User) -> AppResult<User>;
    async fn list_users(
        &self,
        role: Option<UserRole>,
        page: PageQuery,
    ) -> AppResult<(Vec<User>, i64)>;
    async fn users_created_between(
        &self,
        role: UserRole,
        window: TimeWindow,
    ) -> AppResult<Vec<User>>;

    // ─── Service providers ────────────────────────────────────────────────────

    async fn find_provider(&self, id: Uuid) -> AppResult<Option<ServiceProvider>>;
    async fn find_provider_by_user(&self, user_id: Uuid) -> AppResult<Option<ServiceProvider>>;
    /// Persists profile, verification and rate fields. Running totals are only
    /// touched by the guarded payment paths.
    async fn save_provider(&self, provider: &ServiceProvider) -> AppResult<ServiceProvider>;
    async fn list_providers(
        &self,
        status: Option<VerificationStatus>,
    ) -> AppResult<Vec<ServiceProvider>>;
    async fn providers_created_between(&self, window: TimeWindow)
    -> AppResult<Vec<ServiceProvider>>;

    // ─── Categories ───────────────────────────────────────────────────────────

    async fn insert_category(&self, category: &ServiceCategory) -> AppResult<ServiceCategory>;
    async fn find_category(&self, id: Uuid) -> AppResult<Option<ServiceCategory>>;
    async fn list_categories(&self, active_only: bool) -> AppResult<Vec<ServiceCategory>>;
    async fn save_category(&self, category: &ServiceCategory) -> AppResult<ServiceCategory>;
    async fn delete_category(&self, id: Uuid) -> AppResult<bool>;

    // ─── Listings ─────────────────────────────────────────────────────────────

    async fn insert_listing(&self, listing: &ServiceListing) -> AppResult<ServiceListing>;
    async fn find_listing(&self, id: Uuid) -> AppResult<Option<ServiceListing>>;
    async fn save_listing(&self, listing: &ServiceListing) -> AppResult<ServiceListing>;
    async fn list_listings(&self, filter: ListingFilter) -> AppResult<Vec<ServiceListing>>;

    // ─── Bookings ─────────────────────────────────────────────────────────────

    async fn insert_booking(&self, booking: &Booking) -> AppResult<Booking>;
    async fn find_booking(&self, id: Uuid) -> AppResult<Option<Booking>>;
    async fn list_bookings_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Booking>>;
    async fn list_bookings_for_provider(&self, provider_id: Uuid) -> AppResult<Vec<Booking>>;
    /// Compare-and-set on status; `None` when the booking is no longer in `from`.
    async fn transition_booking(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>>;
    async fn bookings_between(&self, window: TimeWindow) -> AppResult<Vec<Booking>>;
    async fn recent_bookings(&self, limit: i64) -> AppResult<Vec<Booking>>;

    // ─── Payments ─────────────────────────────────────────────────────────────

    /// Inserts the payment, confirms a pending booking and inserts the derived
    /// commission atomically. A second payment for the same booking is a `Conflict`;
    /// a booking no longer Pending or Confirmed is a `Validation` and nothing is written.
    async fn record_payment(
        &self,
        payment: &Payment,
        commission: &Commission,
    ) -> AppResult<(Payment, Commission, Booking)>;
    async fn find_payment(&self, id: Uuid) -> AppResult<Option<Payment>>;
    async fn find_payment_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Payment>>;
    async fn insert_gateway_order(&self, order: &GatewayOrder) -> AppResult<GatewayOrder>;
    async fn find_gateway_order(&self, order_id: &str) -> AppResult<Option<GatewayOrder>>;
    async fn list_payments(&self, page: PageQuery) -> AppResult<(Vec<Payment>, i64)>;
    async fn list_payments_for_provider(&self, provider_id: Uuid) -> AppResult<Vec<Payment>>;
    async fn payments_between(&self, window: TimeWindow) -> AppResult<Vec<Payment>>;
    async fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> AppResult<Option<Payment>>;
    /// Sets a non-terminal transfer status. A leg already `Completed` is left as is.
    async fn set_transfer_status(
        &self,
        id: Uuid,
        leg: TransferLeg,
        status: TransferStatus,
    ) -> AppResult<Option<Payment>>;
    /// Marks the provider leg `Completed` and credits the provider's earnings,
    /// once. Returns `false` when the leg was already completed.
    async fn credit_provider_transfer(&self, payment_id: Uuid) -> AppResult<bool>;

    // ─── Commissions ──────────────────────────────────────────────────────────

    async fn find_commission(&self, id: Uuid) -> AppResult<Option<Commission>>;
    async fn find_commission_by_payment(&self, payment_id: Uuid) -> AppResult<Option<Commission>>;
    async fn list_commissions(
        &self,
        status: Option<CommissionStatus>,
        page: PageQuery,
    ) -> AppResult<(Vec<Commission>, i64)>;
    async fn list_commissions_for_provider(&self, provider_id: Uuid)
    -> AppResult<Vec<Commission>>;
    /// `Pending -> Collected`, once: stamps the collection date, completes the
    /// payment's commission leg, credits the provider's commission-paid total
    /// and adds the amount to the earnings bucket of the collection day.
    /// `None` when the commission was not pending.
    async fn collect_commission(
        &self,
        id: Uuid,
        collected_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Option<Commission>>;
    /// `Pending -> Refunded`; `None` when the commission was not pending.
    async fn refund_commission(&self, id: Uuid, notes: Option<&str>)
    -> AppResult<Option<Commission>>;
    async fn list_admin_earnings(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Vec<AdminEarnings>>;

    // ─── Complaints ───────────────────────────────────────────────────────────

    /// One complaint per booking; a duplicate is a `Conflict`.
    async fn insert_complaint(&self, complaint: &Complaint) -> AppResult<Complaint>;
    async fn find_complaint(&self, id: Uuid) -> AppResult<Option<Complaint>>;
    async fn find_complaint_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Complaint>>;
    async fn list_complaints(&self, status: Option<ComplaintStatus>) -> AppResult<Vec<Complaint>>;
    async fn list_complaints_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Complaint>>;
    async fn save_complaint(&self, complaint: &Complaint) -> AppResult<Complaint>;
    async fn complaints_between(&self, window: TimeWindow) -> AppResult<Vec<Complaint>>;

    // ─── Reviews ──────────────────────────────────────────────────────────────

    /// One review per booking; a duplicate is a `Conflict`.
    async fn insert_review(&self, review: &Review) -> AppResult<Review>;
    async fn list_reviews_for_listing(&self, listing_id: Uuid) -> AppResult<Vec<Review>>;

    // ─── Reports ──────────────────────────────────────────────────────────────

    async fn insert_report(&self, report: &Report) -> AppResult<Report>;
    async fn find_report(&self, id: Uuid) -> AppResult<Option<Report>>;
    async fn list_reports(&self, page: PageQuery) -> AppResult<(Vec<Report>, i64)>;
    async fn delete_report(&self, id: Uuid) -> AppResult<bool>;

    // ─── Dashboard ────────────────────────────────────────────────────────────

    async fn dashboard_counts(&self) -> AppResult<DashboardCounts>;
    async fn dashboard_financials(&self) -> AppResult<DashboardFinancials>;

    // ─── Settings ─────────────────────────────────────────────────────────────

    /// Returns the singleton, inserting `defaults` on first access.
    async fn get_or_create_settings(&self, defaults: &Settings) -> AppResult<Settings>;
    /// Compare-and-set on `version`; `None` when the stored version differs.
    async fn update_settings(
        &self,
        update: &UpdateSettingsRequest,
        updated_by: Uuid,
    ) -> AppResult<Option<Settings>>;
}
