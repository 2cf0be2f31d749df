// src/store/memory.rs

//! In-memory [`Store`] used by unit and router tests. Mirrors the unique
//! constraints and guarded updates of the Postgres schema.

use super::{Store, TimeWindow, TransferLeg};
use crate::{
    errors::{AppError, AppResult},
    models::*,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    providers: Vec<ServiceProvider>,
    categories: Vec<ServiceCategory>,
    listings: Vec<ServiceListing>,
    bookings: Vec<Booking>,
    payments: Vec<Payment>,
    gateway_orders: Vec<GatewayOrder>,
    commissions: Vec<Commission>,
    admin_earnings: Vec<AdminEarnings>,
    complaints: Vec<Complaint>,
    reviews: Vec<Review>,
    reports: Vec<Report>,
    settings: Option<Settings>,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    connected: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            connected: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.sort_by_key(|r| std::cmp::Reverse(created_at(r)));
    rows
}

fn page_of<T: Clone>(rows: Vec<T>, page: PageQuery) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let slice = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (slice, total)
}

#[async_trait]
impl Store for MemoryStore {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn ping(&self) -> AppResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(AppError::ServiceUnavailable("Database not connected".to_string()))
        }
    }

    // ─── Users ────────────────────────────────────────────────────────────────

    async fn insert_user(
        &self,
        user: &User,
        provider: Option<&ServiceProvider>,
    ) -> AppResult<User> {
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(
                "User already exists with this email".to_string(),
            ));
        }
        t.users.push(user.clone());
        if let Some(p) = provider {
            t.providers.push(p.clone());
        }
        Ok(user.clone())
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t
            .users
            .iter()
            .find(|u| {
                u.reset_token_hash.as_deref() == Some(token_hash)
                    && u.reset_token_expires_at.is_some_and(|at| at > now)
            })
            .cloned())
    }

    async fn save_user(&self, user: &User) -> AppResult<User> {
        let mut t = self.tables.lock().await;
        if t
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::Conflict(
                "User already exists with this email".to_string(),
            ));
        }
        let row = t
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;
        *row = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(row.clone())
    }

    async fn list_users(
        &self,
        role: Option<UserRole>,
        page: PageQuery,
    ) -> AppResult<(Vec<User>, i64)> {
        let t = self.tables.lock().await;
        let rows = t
            .users
            .iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        Ok(page_of(newest_first(rows, |u: &User| u.created_at), page))
    }

    async fn users_created_between(
        &self,
        role: UserRole,
        window: TimeWindow,
    ) -> AppResult<Vec<User>> {
        let t = self.tables.lock().await;
        Ok(t
            .users
            .iter()
            .filter(|u| u.role == role && window.contains(u.created_at))
            .cloned()
            .collect())
    }

    // ─── Service providers ────────────────────────────────────────────────────

    async fn find_provider(&self, id: Uuid) -> AppResult<Option<ServiceProvider>> {
        let t = self.tables.lock().await;
        Ok(t.providers.iter().find(|p| p.id == id).cloned())
    }

    async fn find_provider_by_user(&self, user_id: Uuid) -> AppResult<Option<ServiceProvider>> {
        let t = self.tables.lock().await;
        Ok(t.providers.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn save_provider(&self, provider: &ServiceProvider) -> AppResult<ServiceProvider> {
        let mut t = self.tables.lock().await;
        let row = t
            .providers
            .iter_mut()
            .find(|p| p.id == provider.id)
            .ok_or_else(|| AppError::NotFound(format!("Service provider {} not found", provider.id)))?;
        row.business_name = provider.business_name.clone();
        row.description = provider.description.clone();
        row.verification_status = provider.verification_status;
        row.commission_rate = provider.commission_rate;
        row.category_ids = provider.category_ids.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn list_providers(
        &self,
        status: Option<VerificationStatus>,
    ) -> AppResult<Vec<ServiceProvider>> {
        let t = self.tables.lock().await;
        let rows = t
            .providers
            .iter()
            .filter(|p| status.is_none_or(|s| p.verification_status == s))
            .cloned()
            .collect();
        Ok(newest_first(rows, |p: &ServiceProvider| p.created_at))
    }

    async fn providers_created_between(
        &self,
        window: TimeWindow,
    ) -> AppResult<Vec<ServiceProvider>> {
        let t = self.tables.lock().await;
        Ok(t
            .providers
            .iter()
            .filter(|p| window.contains(p.created_at))
            .cloned()
            .collect())
    }

    // ─── Categories ───────────────────────────────────────────────────────────

    async fn insert_category(&self, category: &ServiceCategory) -> AppResult<ServiceCategory> {
        let mut t = self.tables.lock().await;
        if t.categories.iter().any(|c| c.name == category.name) {
            return Err(AppError::Conflict(
                "Category with this name already exists".to_string(),
            ));
        }
        t.categories.push(category.clone());
        Ok(category.clone())
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Option<ServiceCategory>> {
        let t = self.tables.lock().await;
        Ok(t.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_categories(&self, active_only: bool) -> AppResult<Vec<ServiceCategory>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<_> = t
            .categories
            .iter()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn save_category(&self, category: &ServiceCategory) -> AppResult<ServiceCategory> {
        let mut t = self.tables.lock().await;
        if t
            .categories
            .iter()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(AppError::Conflict(
                "Category with this name already exists".to_string(),
            ));
        }
        let row = t
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category.id)))?;
        *row = ServiceCategory {
            updated_at: Utc::now(),
            ..category.clone()
        };
        Ok(row.clone())
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<bool> {
        let mut t = self.tables.lock().await;
        if t.listings.iter().any(|l| l.category_id == id) {
            return Err(AppError::Conflict(
                "Category is still used by service listings".to_string(),
            ));
        }
        let before = t.categories.len();
        t.categories.retain(|c| c.id != id);
        Ok(t.categories.len() < before)
    }

    // ─── Listings ─────────────────────────────────────────────────────────────

    async fn insert_listing(&self, listing: &ServiceListing) -> AppResult<ServiceListing> {
        let mut t = self.tables.lock().await;
        t.listings.push(listing.clone());
        Ok(listing.clone())
    }

    async fn find_listing(&self, id: Uuid) -> AppResult<Option<ServiceListing>> {
        let t = self.tables.lock().await;
        Ok(t.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn save_listing(&self, listing: &ServiceListing) -> AppResult<ServiceListing> {
        let mut t = self.tables.lock().await;
        let row = t
            .listings
            .iter_mut()
            .find(|l| l.id == listing.id)
            .ok_or_else(|| AppError::NotFound(format!("Service listing {} not found", listing.id)))?;
        *row = ServiceListing {
            updated_at: Utc::now(),
            ..listing.clone()
        };
        Ok(row.clone())
    }

    async fn list_listings(&self, filter: ListingFilter) -> AppResult<Vec<ServiceListing>> {
        let t = self.tables.lock().await;
        let verified = |provider_id: Uuid| {
            t.providers
                .iter()
                .any(|p| p.id == provider_id && p.verification_status == VerificationStatus::Verified)
        };
        let rows = t
            .listings
            .iter()
            .filter(|l| filter.category_id.is_none_or(|id| l.category_id == id))
            .filter(|l| filter.provider_id.is_none_or(|id| l.service_provider_id == id))
            .filter(|l| !filter.active_only || l.is_active)
            .filter(|l| !filter.verified_only || verified(l.service_provider_id))
            .cloned()
            .collect();
        Ok(newest_first(rows, |l: &ServiceListing| l.created_at))
    }

    // ─── Bookings ─────────────────────────────────────────────────────────────

    async fn insert_booking(&self, booking: &Booking) -> AppResult<Booking> {
        let mut t = self.tables.lock().await;
        t.bookings.push(booking.clone());
        Ok(booking.clone())
    }

    async fn find_booking(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let t = self.tables.lock().await;
        Ok(t.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bookings_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Booking>> {
        let t = self.tables.lock().await;
        let rows = t
            .bookings
            .iter()
            .filter(|b| b.customer_id == customer_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |b: &Booking| b.created_at))
    }

    async fn list_bookings_for_provider(&self, provider_id: Uuid) -> AppResult<Vec<Booking>> {
        let t = self.tables.lock().await;
        let rows = t
            .bookings
            .iter()
            .filter(|b| b.service_provider_id == provider_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |b: &Booking| b.created_at))
    }

    async fn transition_booking(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let mut t = self.tables.lock().await;
        Ok(t
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == from)
            .map(|b| {
                b.status = to;
                b.updated_at = Utc::now();
                b.clone()
            }))
    }

    async fn bookings_between(&self, window: TimeWindow) -> AppResult<Vec<Booking>> {
        let t = self.tables.lock().await;
        Ok(t
            .bookings
            .iter()
            .filter(|b| window.contains(b.created_at))
            .cloned()
            .collect())
    }

    async fn recent_bookings(&self, limit: i64) -> AppResult<Vec<Booking>> {
        let t = self.tables.lock().await;
        let mut rows = newest_first(t.bookings.clone(), |b: &Booking| b.created_at);
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    // ─── Payments ─────────────────────────────────────────────────────────────

    async fn record_payment(
        &self,
        payment: &Payment,
        commission: &Commission,
    ) -> AppResult<(Payment, Commission, Booking)> {
        let mut t = self.tables.lock().await;
        if t.payments.iter().any(|p| p.booking_id == payment.booking_id) {
            return Err(AppError::Conflict(
                "Payment already exists for this booking".to_string(),
            ));
        }
        if t
            .payments
            .iter()
            .any(|p| p.transaction_id == payment.transaction_id)
        {
            return Err(AppError::Conflict(
                "This transaction id has already been recorded".to_string(),
            ));
        }

        let booking = t
            .bookings
            .iter_mut()
            .find(|b| b.id == payment.booking_id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", payment.booking_id)))?;
        if !matches!(booking.status, BookingStatus::Pending | BookingStatus::Confirmed) {
            return Err(AppError::Validation(format!(
                "A {:?} booking cannot be paid for",
                booking.status
            )));
        }
        if booking.status == BookingStatus::Pending {
            booking.status = BookingStatus::Confirmed;
            booking.updated_at = Utc::now();
        }
        let booking = booking.clone();

        let commission = Commission {
            payment_id: payment.id,
            ..commission.clone()
        };
        t.payments.push(payment.clone());
        t.commissions.push(commission.clone());
        Ok((payment.clone(), commission, booking))
    }

    async fn find_payment(&self, id: Uuid) -> AppResult<Option<Payment>> {
        let t = self.tables.lock().await;
        Ok(t.payments.iter().find(|p| p.id == id).cloned())
    }

    async fn find_payment_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Payment>> {
        let t = self.tables.lock().await;
        Ok(t.payments.iter().find(|p| p.booking_id == booking_id).cloned())
    }

    async fn insert_gateway_order(&self, order: &GatewayOrder) -> AppResult<GatewayOrder> {
        let mut t = self.tables.lock().await;
        if t.gateway_orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(AppError::Conflict("Gateway order already recorded".to_string()));
        }
        t.gateway_orders.push(order.clone());
        Ok(order.clone())
    }

    async fn find_gateway_order(&self, order_id: &str) -> AppResult<Option<GatewayOrder>> {
        let t = self.tables.lock().await;
        Ok(t.gateway_orders.iter().find(|o| o.order_id == order_id).cloned())
    }

    async fn list_payments(&self, page: PageQuery) -> AppResult<(Vec<Payment>, i64)> {
        let t = self.tables.lock().await;
        Ok(page_of(
            newest_first(t.payments.clone(), |p: &Payment| p.created_at),
            page,
        ))
    }

    async fn list_payments_for_provider(&self, provider_id: Uuid) -> AppResult<Vec<Payment>> {
        let t = self.tables.lock().await;
        let rows = t
            .payments
            .iter()
            .filter(|p| p.service_provider_id == provider_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |p: &Payment| p.created_at))
    }

    async fn payments_between(&self, window: TimeWindow) -> AppResult<Vec<Payment>> {
        let t = self.tables.lock().await;
        Ok(t
            .payments
            .iter()
            .filter(|p| window.contains(p.created_at))
            .cloned()
            .collect())
    }

    async fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> AppResult<Option<Payment>> {
        let mut t = self.tables.lock().await;
        Ok(t.payments.iter_mut().find(|p| p.id == id).map(|p| {
            p.payment_status = status;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn set_transfer_status(
        &self,
        id: Uuid,
        leg: TransferLeg,
        status: TransferStatus,
    ) -> AppResult<Option<Payment>> {
        let mut t = self.tables.lock().await;
        Ok(t.payments.iter_mut().find(|p| p.id == id).map(|p| {
            let field = match leg {
                TransferLeg::Commission => &mut p.commission_transfer_status,
                TransferLeg::Provider => &mut p.provider_transfer_status,
            };
            if *field != TransferStatus::Completed {
                *field = status;
                p.updated_at = Utc::now();
            }
            p.clone()
        }))
    }

    async fn credit_provider_transfer(&self, payment_id: Uuid) -> AppResult<bool> {
        let mut t = self.tables.lock().await;
        let Some(payment) = t
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id && p.provider_transfer_status != TransferStatus::Completed)
        else {
            return Ok(false);
        };
        payment.provider_transfer_status = TransferStatus::Completed;
        payment.updated_at = Utc::now();
        let (provider_id, amount) = (payment.service_provider_id, payment.provider_amount);

        if let Some(provider) = t.providers.iter_mut().find(|p| p.id == provider_id) {
            provider.total_earnings += amount;
        }
        Ok(true)
    }

    // ─── Commissions ──────────────────────────────────────────────────────────

    async fn find_commission(&self, id: Uuid) -> AppResult<Option<Commission>> {
        let t = self.tables.lock().await;
        Ok(t.commissions.iter().find(|c| c.id == id).cloned())
    }

    async fn find_commission_by_payment(&self, payment_id: Uuid) -> AppResult<Option<Commission>> {
        let t = self.tables.lock().await;
        Ok(t.commissions.iter().find(|c| c.payment_id == payment_id).cloned())
    }

    async fn list_commissions(
        &self,
        status: Option<CommissionStatus>,
        page: PageQuery,
    ) -> AppResult<(Vec<Commission>, i64)> {
        let t = self.tables.lock().await;
        let rows = t
            .commissions
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        Ok(page_of(newest_first(rows, |c: &Commission| c.created_at), page))
    }

    async fn list_commissions_for_provider(
        &self,
        provider_id: Uuid,
    ) -> AppResult<Vec<Commission>> {
        let t = self.tables.lock().await;
        let rows = t
            .commissions
            .iter()
            .filter(|c| c.service_provider_id == provider_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |c: &Commission| c.created_at))
    }

    async fn collect_commission(
        &self,
        id: Uuid,
        collected_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Option<Commission>> {
        let mut t = self.tables.lock().await;
        let Some(commission) = t
            .commissions
            .iter_mut()
            .find(|c| c.id == id && c.status == CommissionStatus::Pending)
        else {
            return Ok(None);
        };
        commission.status = CommissionStatus::Collected;
        commission.collection_date = Some(collected_at);
        if let Some(notes) = notes {
            commission.notes = Some(notes.to_string());
        }
        commission.updated_at = Utc::now();
        let commission = commission.clone();

        if let Some(payment) = t.payments.iter_mut().find(|p| p.id == commission.payment_id) {
            payment.commission_transfer_status = TransferStatus::Completed;
        }
        if let Some(provider) = t
            .providers
            .iter_mut()
            .find(|p| p.id == commission.service_provider_id)
        {
            provider.total_commission_paid += commission.amount;
        }

        let day = collected_at.date_naive();
        match t.admin_earnings.iter_mut().find(|e| e.date == day) {
            Some(bucket) => {
                bucket.total_commission_earned += commission.amount;
                bucket.commission_ids.push(commission.id);
                bucket.updated_at = Utc::now();
            }
            None => t.admin_earnings.push(AdminEarnings {
                id: Uuid::new_v4(),
                date: day,
                total_commission_earned: commission.amount,
                commission_ids: vec![commission.id],
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }),
        }

        Ok(Some(commission))
    }

    async fn refund_commission(
        &self,
        id: Uuid,
        notes: Option<&str>,
    ) -> AppResult<Option<Commission>> {
        let mut t = self.tables.lock().await;
        Ok(t
            .commissions
            .iter_mut()
            .find(|c| c.id == id && c.status == CommissionStatus::Pending)
            .map(|c| {
                c.status = CommissionStatus::Refunded;
                if let Some(notes) = notes {
                    c.notes = Some(notes.to_string());
                }
                c.updated_at = Utc::now();
                c.clone()
            }))
    }

    async fn list_admin_earnings(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Vec<AdminEarnings>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<_> = t
            .admin_earnings
            .iter()
            .filter(|e| start.is_none_or(|s| e.date >= s) && end.is_none_or(|d| e.date <= d))
            .cloned()
            .collect();
        rows.sort_by_key(|e| std::cmp::Reverse(e.date));
        Ok(rows)
    }

    // ─── Complaints ───────────────────────────────────────────────────────────

    async fn insert_complaint(&self, complaint: &Complaint) -> AppResult<Complaint> {
        let mut t = self.tables.lock().await;
        if t.complaints.iter().any(|c| c.booking_id == complaint.booking_id) {
            return Err(AppError::Conflict(
                "A complaint has already been filed for this booking".to_string(),
            ));
        }
        t.complaints.push(complaint.clone());
        Ok(complaint.clone())
    }

    async fn find_complaint(&self, id: Uuid) -> AppResult<Option<Complaint>> {
        let t = self.tables.lock().await;
        Ok(t.complaints.iter().find(|c| c.id == id).cloned())
    }

    async fn find_complaint_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Complaint>> {
        let t = self.tables.lock().await;
        Ok(t.complaints.iter().find(|c| c.booking_id == booking_id).cloned())
    }

    async fn list_complaints(&self, status: Option<ComplaintStatus>) -> AppResult<Vec<Complaint>> {
        let t = self.tables.lock().await;
        let rows = t
            .complaints
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        Ok(newest_first(rows, |c: &Complaint| c.created_at))
    }

    async fn list_complaints_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Complaint>> {
        let t = self.tables.lock().await;
        let rows = t
            .complaints
            .iter()
            .filter(|c| c.customer_id == customer_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |c: &Complaint| c.created_at))
    }

    async fn save_complaint(&self, complaint: &Complaint) -> AppResult<Complaint> {
        let mut t = self.tables.lock().await;
        let row = t
            .complaints
            .iter_mut()
            .find(|c| c.id == complaint.id)
            .ok_or_else(|| AppError::NotFound(format!("Complaint {} not found", complaint.id)))?;
        *row = Complaint {
            updated_at: Utc::now(),
            ..complaint.clone()
        };
        Ok(row.clone())
    }

    async fn complaints_between(&self, window: TimeWindow) -> AppResult<Vec<Complaint>> {
        let t = self.tables.lock().await;
        Ok(t
            .complaints
            .iter()
            .filter(|c| window.contains(c.created_at))
            .cloned()
            .collect())
    }

    // ─── Reviews ──────────────────────────────────────────────────────────────

    async fn insert_review(&self, review: &Review) -> AppResult<Review> {
        let mut t = self.tables.lock().await;
        if t.reviews.iter().any(|r| r.booking_id == review.booking_id) {
            return Err(AppError::Conflict(
                "This booking has already been reviewed".to_string(),
            ));
        }
        t.reviews.push(review.clone());
        Ok(review.clone())
    }

    async fn list_reviews_for_listing(&self, listing_id: Uuid) -> AppResult<Vec<Review>> {
        let t = self.tables.lock().await;
        let rows = t
            .reviews
            .iter()
            .filter(|r| r.service_listing_id == listing_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |r: &Review| r.created_at))
    }

    // ─── Reports ──────────────────────────────────────────────────────────────

    async fn insert_report(&self, report: &Report) -> AppResult<Report> {
        let mut t = self.tables.lock().await;
        t.reports.push(report.clone());
        Ok(report.clone())
    }

    async fn find_report(&self, id: Uuid) -> AppResult<Option<Report>> {
        let t = self.tables.lock().await;
        Ok(t.reports.iter().find(|r| r.id == id).cloned())
    }

    async fn list_reports(&self, page: PageQuery) -> AppResult<(Vec<Report>, i64)> {
        let t = self.tables.lock().await;
        Ok(page_of(
            newest_first(t.reports.clone(), |r: &Report| r.created_at),
            page,
        ))
    }

    async fn delete_report(&self, id: Uuid) -> AppResult<bool> {
        let mut t = self.tables.lock().await;
        let before = t.reports.len();
        t.reports.retain(|r| r.id != id);
        Ok(t.reports.len() < before)
    }

    // ─── Dashboard ────────────────────────────────────────────────────────────

    async fn dashboard_counts(&self) -> AppResult<DashboardCounts> {
        let t = self.tables.lock().await;
        let count = |n: usize| n as i64;
        Ok(DashboardCounts {
            total_customers: count(t.users.iter().filter(|u| u.role == UserRole::Customer).count()),
            total_providers: count(t.providers.len()),
            pending_providers: count(
                t.providers
                    .iter()
                    .filter(|p| p.verification_status == VerificationStatus::Pending)
                    .count(),
            ),
            active_listings: count(t.listings.iter().filter(|l| l.is_active).count()),
            total_bookings: count(t.bookings.len()),
            pending_bookings: count(
                t.bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Pending)
                    .count(),
            ),
            completed_bookings: count(
                t.bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Completed)
                    .count(),
            ),
            open_complaints: count(t.complaints.iter().filter(|c| !c.status.is_settled()).count()),
        })
    }

    async fn dashboard_financials(&self) -> AppResult<DashboardFinancials> {
        let t = self.tables.lock().await;
        let completed = || {
            t.payments
                .iter()
                .filter(|p| p.payment_status == PaymentStatus::Completed)
        };
        let commission_sum = |status: CommissionStatus| -> Decimal {
            t.commissions
                .iter()
                .filter(|c| c.status == status)
                .map(|c| c.amount)
                .sum()
        };
        Ok(DashboardFinancials {
            total_revenue: completed().map(|p| p.amount).sum(),
            total_commission: completed().map(|p| p.commission_amount).sum(),
            collected_commission: commission_sum(CommissionStatus::Collected),
            pending_commission: commission_sum(CommissionStatus::Pending),
        })
    }

    // ─── Settings ─────────────────────────────────────────────────────────────

    async fn get_or_create_settings(&self, defaults: &Settings) -> AppResult<Settings> {
        let mut t = self.tables.lock().await;
        Ok(t.settings.get_or_insert_with(|| defaults.clone()).clone())
    }

    async fn update_settings(
        &self,
        update: &UpdateSettingsRequest,
        updated_by: Uuid,
    ) -> AppResult<Option<Settings>> {
        let mut t = self.tables.lock().await;
        let Some(settings) = t.settings.as_mut().filter(|s| s.version == update.version) else {
            return Ok(None);
        };
        if let Some(general) = &update.general {
            settings.general = general.clone();
        }
        if let Some(commission) = &update.commission {
            settings.commission = commission.clone();
        }
        if let Some(notifications) = &update.notifications {
            settings.notifications = notifications.clone();
        }
        if let Some(security) = &update.security {
            settings.security = security.clone();
        }
        settings.version += 1;
        settings.updated_by = Some(updated_by);
        settings.updated_at = Utc::now();
        Ok(Some(settings.clone()))
    }
}
