// src/store/postgres.rs

use super::{Store, TimeWindow, TransferLeg};
use crate::{
    errors::{AppError, AppResult},
    models::*,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, types::Json};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    /// Result of the latest ping; read by the request gate without touching the pool.
    connected: Arc<AtomicBool>,
}

impl PgStore {
    /// Assumes the pool was just connected; the first failed ping clears the flag.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Pings the database every `interval` so the gate tracks outages and recoveries.
    pub fn spawn_health_monitor(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let _ = store.ping().await;
            }
        })
    }

    fn mark(&self, connected: bool) {
        let was = self.connected.swap(connected, Ordering::SeqCst);
        match (was, connected) {
            (true, false) => warn!("Database connection lost"),
            (false, true) => info!("Database connection restored"),
            _ => {}
        }
    }
}

fn payment_conflict(err: sqlx::Error) -> AppError {
    let on_transaction = err
        .as_database_error()
        .and_then(|db| db.constraint())
        .is_some_and(|c| c == "payments_transaction_id_key");
    if on_transaction {
        AppError::unique_violation(err, "This transaction id has already been recorded")
    } else {
        AppError::unique_violation(err, "Payment already exists for this booking")
    }
}

fn not_found(what: &str, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl Store for PgStore {
    fn is_connected(&self) -> bool {
        !self.pool.is_closed() && self.connected.load(Ordering::SeqCst)
    }

    async fn ping(&self) -> AppResult<()> {
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        self.mark(result.is_ok());
        result?;
        Ok(())
    }

    // ─── Users ────────────────────────────────────────────────────────────────

    async fn insert_user(
        &self,
        user: &User,
        provider: Option<&ServiceProvider>,
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (
                id, name, email, phone, password_hash, role, is_active, address,
                reset_token_hash, reset_token_expires_at, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            RETURNING *"#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(Json(&user.address))
        .bind(&user.reset_token_hash)
        .bind(user.reset_token_expires_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::unique_violation(e, "User already exists with this email"))?;

        if let Some(p) = provider {
            sqlx::query(
                r#"INSERT INTO service_providers (
                    id, user_id, business_name, description, verification_status,
                    commission_rate, total_earnings, total_commission_paid, category_ids,
                    created_at, updated_at
                ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)"#,
            )
            .bind(p.id)
            .bind(p.user_id)
            .bind(&p.business_name)
            .bind(&p.description)
            .bind(p.verification_status)
            .bind(p.commission_rate)
            .bind(p.total_earnings)
            .bind(p.total_commission_paid)
            .bind(&p.category_ids)
            .bind(p.created_at)
            .bind(p.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE reset_token_hash = $1 AND reset_token_expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save_user(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users
               SET name = $2, email = $3, phone = $4, password_hash = $5, role = $6,
                   is_active = $7, address = $8, reset_token_hash = $9,
                   reset_token_expires_at = $10, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(Json(&user.address))
        .bind(&user.reset_token_hash)
        .bind(user.reset_token_expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "User already exists with this email"))?
        .ok_or_else(|| not_found("User", user.id))
    }

    async fn list_users(
        &self,
        role: Option<UserRole>,
        page: PageQuery,
    ) -> AppResult<(Vec<User>, i64)> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users
               WHERE ($1::user_role IS NULL OR role = $1)
               ORDER BY created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(role)
        .bind(i64::from(page.limit()))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE ($1::user_role IS NULL OR role = $1)",
        )
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok((users, total))
    }

    async fn users_created_between(
        &self,
        role: UserRole,
        window: TimeWindow,
    ) -> AppResult<Vec<User>> {
        Ok(sqlx::query_as::<_, User>(
            r#"SELECT * FROM users
               WHERE role = $1 AND created_at >= $2 AND created_at <= $3
               ORDER BY created_at"#,
        )
        .bind(role)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?)
    }

    // ─── Service providers ────────────────────────────────────────────────────

    async fn find_provider(&self, id: Uuid) -> AppResult<Option<ServiceProvider>> {
        Ok(
            sqlx::query_as::<_, ServiceProvider>("SELECT * FROM service_providers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_provider_by_user(&self, user_id: Uuid) -> AppResult<Option<ServiceProvider>> {
        Ok(sqlx::query_as::<_, ServiceProvider>(
            "SELECT * FROM service_providers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save_provider(&self, provider: &ServiceProvider) -> AppResult<ServiceProvider> {
        sqlx::query_as::<_, ServiceProvider>(
            r#"UPDATE service_providers
               SET business_name = $2, description = $3, verification_status = $4,
                   commission_rate = $5, category_ids = $6, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(provider.id)
        .bind(&provider.business_name)
        .bind(&provider.description)
        .bind(provider.verification_status)
        .bind(provider.commission_rate)
        .bind(&provider.category_ids)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Service provider", provider.id))
    }

    async fn list_providers(
        &self,
        status: Option<VerificationStatus>,
    ) -> AppResult<Vec<ServiceProvider>> {
        Ok(sqlx::query_as::<_, ServiceProvider>(
            r#"SELECT * FROM service_providers
               WHERE ($1::verification_status IS NULL OR verification_status = $1)
               ORDER BY created_at DESC"#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn providers_created_between(
        &self,
        window: TimeWindow,
    ) -> AppResult<Vec<ServiceProvider>> {
        Ok(sqlx::query_as::<_, ServiceProvider>(
            r#"SELECT * FROM service_providers
               WHERE created_at >= $1 AND created_at <= $2
               ORDER BY created_at"#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?)
    }

    // ─── Categories ───────────────────────────────────────────────────────────

    async fn insert_category(&self, category: &ServiceCategory) -> AppResult<ServiceCategory> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"INSERT INTO service_categories (id, name, description, is_active, created_at, updated_at)
               VALUES ($1,$2,$3,$4,$5,$6)
               RETURNING *"#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "Category with this name already exists"))
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Option<ServiceCategory>> {
        Ok(sqlx::query_as::<_, ServiceCategory>(
            "SELECT * FROM service_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_categories(&self, active_only: bool) -> AppResult<Vec<ServiceCategory>> {
        Ok(sqlx::query_as::<_, ServiceCategory>(
            "SELECT * FROM service_categories WHERE (NOT $1 OR is_active) ORDER BY name",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn save_category(&self, category: &ServiceCategory) -> AppResult<ServiceCategory> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"UPDATE service_categories
               SET name = $2, description = $3, is_active = $4, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "Category with this name already exists"))?
        .ok_or_else(|| not_found("Category", category.id))
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM service_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.is_foreign_key_violation() => {
                    AppError::Conflict("Category is still used by service listings".to_string())
                }
                _ => AppError::Database(e),
            })?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Listings ─────────────────────────────────────────────────────────────

    async fn insert_listing(&self, listing: &ServiceListing) -> AppResult<ServiceListing> {
        Ok(sqlx::query_as::<_, ServiceListing>(
            r#"INSERT INTO service_listings (
                id, service_provider_id, category_id, title, service_details, service_price,
                commission_rate, commission_amount, provider_earning, tags, is_active,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            RETURNING *"#,
        )
        .bind(listing.id)
        .bind(listing.service_provider_id)
        .bind(listing.category_id)
        .bind(&listing.title)
        .bind(&listing.service_details)
        .bind(listing.service_price)
        .bind(listing.commission_rate)
        .bind(listing.commission_amount)
        .bind(listing.provider_earning)
        .bind(&listing.tags)
        .bind(listing.is_active)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_listing(&self, id: Uuid) -> AppResult<Option<ServiceListing>> {
        Ok(
            sqlx::query_as::<_, ServiceListing>("SELECT * FROM service_listings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn save_listing(&self, listing: &ServiceListing) -> AppResult<ServiceListing> {
        sqlx::query_as::<_, ServiceListing>(
            r#"UPDATE service_listings
               SET category_id = $2, title = $3, service_details = $4, service_price = $5,
                   commission_rate = $6, commission_amount = $7, provider_earning = $8,
                   tags = $9, is_active = $10, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(listing.id)
        .bind(listing.category_id)
        .bind(&listing.title)
        .bind(&listing.service_details)
        .bind(listing.service_price)
        .bind(listing.commission_rate)
        .bind(listing.commission_amount)
        .bind(listing.provider_earning)
        .bind(&listing.tags)
        .bind(listing.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Service listing", listing.id))
    }

    async fn list_listings(&self, filter: ListingFilter) -> AppResult<Vec<ServiceListing>> {
        Ok(sqlx::query_as::<_, ServiceListing>(
            r#"SELECT l.* FROM service_listings l
               JOIN service_providers p ON p.id = l.service_provider_id
               WHERE ($1::uuid IS NULL OR l.category_id = $1)
                 AND ($2::uuid IS NULL OR l.service_provider_id = $2)
                 AND (NOT $3 OR l.is_active)
                 AND (NOT $4 OR p.verification_status = 'verified')
               ORDER BY l.created_at DESC"#,
        )
        .bind(filter.category_id)
        .bind(filter.provider_id)
        .bind(filter.active_only)
        .bind(filter.verified_only)
        .fetch_all(&self.pool)
        .await?)
    }

    // ─── Bookings ─────────────────────────────────────────────────────────────

    async fn insert_booking(&self, booking: &Booking) -> AppResult<Booking> {
        Ok(sqlx::query_as::<_, Booking>(
            r#"INSERT INTO bookings (
                id, customer_id, service_provider_id, service_listing_id, service_date_time,
                special_instructions, total_amount, commission_amount, provider_earning,
                status, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            RETURNING *"#,
        )
        .bind(booking.id)
        .bind(booking.customer_id)
        .bind(booking.service_provider_id)
        .bind(booking.service_listing_id)
        .bind(booking.service_date_time)
        .bind(&booking.special_instructions)
        .bind(booking.total_amount)
        .bind(booking.commission_amount)
        .bind(booking.provider_earning)
        .bind(booking.status)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_booking(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_bookings_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Booking>> {
        Ok(sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_bookings_for_provider(&self, provider_id: Uuid) -> AppResult<Vec<Booking>> {
        Ok(sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE service_provider_id = $1 ORDER BY created_at DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn transition_booking(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        Ok(sqlx::query_as::<_, Booking>(
            r#"UPDATE bookings SET status = $3, updated_at = NOW()
               WHERE id = $1 AND status = $2
               RETURNING *"#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn bookings_between(&self, window: TimeWindow) -> AppResult<Vec<Booking>> {
        Ok(sqlx::query_as::<_, Booking>(
            r#"SELECT * FROM bookings
               WHERE created_at >= $1 AND created_at <= $2
               ORDER BY created_at"#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn recent_bookings(&self, limit: i64) -> AppResult<Vec<Booking>> {
        Ok(sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    // ─── Payments ─────────────────────────────────────────────────────────────

    async fn record_payment(
        &self,
        payment: &Payment,
        commission: &Commission,
    ) -> AppResult<(Payment, Commission, Booking)> {
        let mut tx = self.pool.begin().await?;

        // Row lock so a cancel racing this payment is seen before anything is written
        let status: Option<BookingStatus> =
            sqlx::query_scalar("SELECT status FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(payment.booking_id)
                .fetch_optional(&mut *tx)
                .await?;
        match status {
            None => return Err(not_found("Booking", payment.booking_id)),
            Some(BookingStatus::Pending | BookingStatus::Confirmed) => {}
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "A {:?} booking cannot be paid for",
                    other
                )));
            }
        }

        // payments.booking_id is UNIQUE: a concurrent second payment fails here
        let payment = sqlx::query_as::<_, Payment>(
            r#"INSERT INTO payments (
                id, booking_id, customer_id, service_provider_id, amount, payment_method,
                transaction_id, gateway_order_id, payment_status, commission_amount,
                provider_amount, commission_transfer_status, provider_transfer_status,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)
            RETURNING *"#,
        )
        .bind(payment.id)
        .bind(payment.booking_id)
        .bind(payment.customer_id)
        .bind(payment.service_provider_id)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(&payment.transaction_id)
        .bind(&payment.gateway_order_id)
        .bind(payment.payment_status)
        .bind(payment.commission_amount)
        .bind(payment.provider_amount)
        .bind(payment.commission_transfer_status)
        .bind(payment.provider_transfer_status)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(payment_conflict)?;

        sqlx::query(
            r#"UPDATE bookings SET status = 'confirmed', updated_at = NOW()
               WHERE id = $1 AND status = 'pending'"#,
        )
        .bind(payment.booking_id)
        .execute(&mut *tx)
        .await?;

        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(payment.booking_id)
            .fetch_one(&mut *tx)
            .await?;

        let commission = sqlx::query_as::<_, Commission>(
            r#"INSERT INTO commissions (
                id, payment_id, booking_id, service_provider_id, amount, rate, status,
                collection_date, notes, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            RETURNING *"#,
        )
        .bind(commission.id)
        .bind(payment.id)
        .bind(commission.booking_id)
        .bind(commission.service_provider_id)
        .bind(commission.amount)
        .bind(commission.rate)
        .bind(commission.status)
        .bind(commission.collection_date)
        .bind(&commission.notes)
        .bind(commission.created_at)
        .bind(commission.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((payment, commission, booking))
    }

    async fn find_payment(&self, id: Uuid) -> AppResult<Option<Payment>> {
        Ok(sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_payment_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Payment>> {
        Ok(
            sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE booking_id = $1")
                .bind(booking_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_gateway_order(&self, order: &GatewayOrder) -> AppResult<GatewayOrder> {
        Ok(sqlx::query_as::<_, GatewayOrder>(
            r#"INSERT INTO gateway_orders (order_id, booking_id, amount, currency, created_at)
               VALUES ($1,$2,$3,$4,$5)
               RETURNING *"#,
        )
        .bind(&order.order_id)
        .bind(order.booking_id)
        .bind(order.amount)
        .bind(&order.currency)
        .bind(order.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_gateway_order(&self, order_id: &str) -> AppResult<Option<GatewayOrder>> {
        Ok(
            sqlx::query_as::<_, GatewayOrder>("SELECT * FROM gateway_orders WHERE order_id = $1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_payments(&self, page: PageQuery) -> AppResult<(Vec<Payment>, i64)> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(page.limit()))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await?;

        Ok((payments, total))
    }

    async fn list_payments_for_provider(&self, provider_id: Uuid) -> AppResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE service_provider_id = $1 ORDER BY created_at DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn payments_between(&self, window: TimeWindow) -> AppResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            r#"SELECT * FROM payments
               WHERE created_at >= $1 AND created_at <= $2
               ORDER BY created_at"#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> AppResult<Option<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            r#"UPDATE payments SET payment_status = $2, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_transfer_status(
        &self,
        id: Uuid,
        leg: TransferLeg,
        status: TransferStatus,
    ) -> AppResult<Option<Payment>> {
        let sql = match leg {
            TransferLeg::Commission => {
                r#"UPDATE payments SET commission_transfer_status = $2, updated_at = NOW()
                   WHERE id = $1 AND commission_transfer_status <> 'completed'
                   RETURNING *"#
            }
            TransferLeg::Provider => {
                r#"UPDATE payments SET provider_transfer_status = $2, updated_at = NOW()
                   WHERE id = $1 AND provider_transfer_status <> 'completed'
                   RETURNING *"#
            }
        };

        let updated = sqlx::query_as::<_, Payment>(sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(payment) => Ok(Some(payment)),
            None => self.find_payment(id).await,
        }
    }

    async fn credit_provider_transfer(&self, payment_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let transitioned = sqlx::query_as::<_, (Uuid, Decimal)>(
            r#"UPDATE payments SET provider_transfer_status = 'completed', updated_at = NOW()
               WHERE id = $1 AND provider_transfer_status <> 'completed'
               RETURNING service_provider_id, provider_amount"#,
        )
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((provider_id, provider_amount)) = transitioned else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query(
            r#"UPDATE service_providers
               SET total_earnings = total_earnings + $2, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(provider_id)
        .bind(provider_amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            "Provider {} credited {} for payment {}",
            provider_id, provider_amount, payment_id
        );
        Ok(true)
    }

    // ─── Commissions ──────────────────────────────────────────────────────────

    async fn find_commission(&self, id: Uuid) -> AppResult<Option<Commission>> {
        Ok(sqlx::query_as::<_, Commission>("SELECT * FROM commissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_commission_by_payment(&self, payment_id: Uuid) -> AppResult<Option<Commission>> {
        Ok(
            sqlx::query_as::<_, Commission>("SELECT * FROM commissions WHERE payment_id = $1")
                .bind(payment_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_commissions(
        &self,
        status: Option<CommissionStatus>,
        page: PageQuery,
    ) -> AppResult<(Vec<Commission>, i64)> {
        let commissions = sqlx::query_as::<_, Commission>(
            r#"SELECT * FROM commissions
               WHERE ($1::commission_status IS NULL OR status = $1)
               ORDER BY created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(status)
        .bind(i64::from(page.limit()))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM commissions WHERE ($1::commission_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((commissions, total))
    }

    async fn list_commissions_for_provider(
        &self,
        provider_id: Uuid,
    ) -> AppResult<Vec<Commission>> {
        Ok(sqlx::query_as::<_, Commission>(
            "SELECT * FROM commissions WHERE service_provider_id = $1 ORDER BY created_at DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn collect_commission(
        &self,
        id: Uuid,
        collected_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Option<Commission>> {
        let mut tx = self.pool.begin().await?;

        let collected = sqlx::query_as::<_, Commission>(
            r#"UPDATE commissions
               SET status = 'collected', collection_date = $2,
                   notes = COALESCE($3, notes), updated_at = NOW()
               WHERE id = $1 AND status = 'pending'
               RETURNING *"#,
        )
        .bind(id)
        .bind(collected_at)
        .bind(notes)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(commission) = collected else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"UPDATE payments SET commission_transfer_status = 'completed', updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(commission.payment_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"UPDATE service_providers
               SET total_commission_paid = total_commission_paid + $2, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(commission.service_provider_id)
        .bind(commission.amount)
        .execute(&mut *tx)
        .await?;

        // Bucketed by the day of collection, not the day the commission was created
        sqlx::query(
            r#"INSERT INTO admin_earnings (
                id, date, total_commission_earned, commission_ids, created_at, updated_at
            ) VALUES ($1, $2, $3, ARRAY[$4]::uuid[], NOW(), NOW())
            ON CONFLICT (date) DO UPDATE
            SET total_commission_earned = admin_earnings.total_commission_earned + EXCLUDED.total_commission_earned,
                commission_ids = array_append(admin_earnings.commission_ids, $4),
                updated_at = NOW()"#,
        )
        .bind(Uuid::new_v4())
        .bind(collected_at.date_naive())
        .bind(commission.amount)
        .bind(commission.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(commission))
    }

    async fn refund_commission(
        &self,
        id: Uuid,
        notes: Option<&str>,
    ) -> AppResult<Option<Commission>> {
        Ok(sqlx::query_as::<_, Commission>(
            r#"UPDATE commissions
               SET status = 'refunded', notes = COALESCE($2, notes), updated_at = NOW()
               WHERE id = $1 AND status = 'pending'
               RETURNING *"#,
        )
        .bind(id)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_admin_earnings(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Vec<AdminEarnings>> {
        Ok(sqlx::query_as::<_, AdminEarnings>(
            r#"SELECT * FROM admin_earnings
               WHERE ($1::date IS NULL OR date >= $1)
                 AND ($2::date IS NULL OR date <= $2)
               ORDER BY date DESC"#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?)
    }

    // ─── Complaints ───────────────────────────────────────────────────────────

    async fn insert_complaint(&self, complaint: &Complaint) -> AppResult<Complaint> {
        sqlx::query_as::<_, Complaint>(
            r#"INSERT INTO complaints (
                id, booking_id, customer_id, service_provider_id, subject, description,
                status, resolution, resolved_by, resolved_at, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            RETURNING *"#,
        )
        .bind(complaint.id)
        .bind(complaint.booking_id)
        .bind(complaint.customer_id)
        .bind(complaint.service_provider_id)
        .bind(&complaint.subject)
        .bind(&complaint.description)
        .bind(complaint.status)
        .bind(&complaint.resolution)
        .bind(complaint.resolved_by)
        .bind(complaint.resolved_at)
        .bind(complaint.created_at)
        .bind(complaint.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::unique_violation(e, "A complaint has already been filed for this booking")
        })
    }

    async fn find_complaint(&self, id: Uuid) -> AppResult<Option<Complaint>> {
        Ok(sqlx::query_as::<_, Complaint>("SELECT * FROM complaints WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_complaint_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Complaint>> {
        Ok(
            sqlx::query_as::<_, Complaint>("SELECT * FROM complaints WHERE booking_id = $1")
                .bind(booking_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_complaints(&self, status: Option<ComplaintStatus>) -> AppResult<Vec<Complaint>> {
        Ok(sqlx::query_as::<_, Complaint>(
            r#"SELECT * FROM complaints
               WHERE ($1::complaint_status IS NULL OR status = $1)
               ORDER BY created_at DESC"#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_complaints_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Complaint>> {
        Ok(sqlx::query_as::<_, Complaint>(
            "SELECT * FROM complaints WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn save_complaint(&self, complaint: &Complaint) -> AppResult<Complaint> {
        sqlx::query_as::<_, Complaint>(
            r#"UPDATE complaints
               SET status = $2, resolution = $3, resolved_by = $4, resolved_at = $5,
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(complaint.id)
        .bind(complaint.status)
        .bind(&complaint.resolution)
        .bind(complaint.resolved_by)
        .bind(complaint.resolved_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("Complaint", complaint.id))
    }

    async fn complaints_between(&self, window: TimeWindow) -> AppResult<Vec<Complaint>> {
        Ok(sqlx::query_as::<_, Complaint>(
            r#"SELECT * FROM complaints
               WHERE created_at >= $1 AND created_at <= $2
               ORDER BY created_at"#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?)
    }

    // ─── Reviews ──────────────────────────────────────────────────────────────

    async fn insert_review(&self, review: &Review) -> AppResult<Review> {
        sqlx::query_as::<_, Review>(
            r#"INSERT INTO reviews (
                id, booking_id, customer_id, service_provider_id, service_listing_id,
                rating, comment, created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *"#,
        )
        .bind(review.id)
        .bind(review.booking_id)
        .bind(review.customer_id)
        .bind(review.service_provider_id)
        .bind(review.service_listing_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "This booking has already been reviewed"))
    }

    async fn list_reviews_for_listing(&self, listing_id: Uuid) -> AppResult<Vec<Review>> {
        Ok(sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE service_listing_id = $1 ORDER BY created_at DESC",
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // ─── Reports ──────────────────────────────────────────────────────────────

    async fn insert_report(&self, report: &Report) -> AppResult<Report> {
        Ok(sqlx::query_as::<_, Report>(
            r#"INSERT INTO reports (
                id, report_type, title, time_frame, start_date, end_date, data,
                total_revenue, total_commission, generated_by, created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            RETURNING *"#,
        )
        .bind(report.id)
        .bind(report.report_type)
        .bind(&report.title)
        .bind(report.time_frame)
        .bind(report.start_date)
        .bind(report.end_date)
        .bind(&report.data)
        .bind(report.total_revenue)
        .bind(report.total_commission)
        .bind(report.generated_by)
        .bind(report.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_report(&self, id: Uuid) -> AppResult<Option<Report>> {
        Ok(sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_reports(&self, page: PageQuery) -> AppResult<(Vec<Report>, i64)> {
        let reports = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(page.limit()))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;

        Ok((reports, total))
    }

    async fn delete_report(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Dashboard ────────────────────────────────────────────────────────────

    async fn dashboard_counts(&self) -> AppResult<DashboardCounts> {
        Ok(sqlx::query_as::<_, DashboardCounts>(
            r#"SELECT
                (SELECT COUNT(*) FROM users WHERE role = 'customer') AS total_customers,
                (SELECT COUNT(*) FROM service_providers) AS total_providers,
                (SELECT COUNT(*) FROM service_providers WHERE verification_status = 'pending') AS pending_providers,
                (SELECT COUNT(*) FROM service_listings WHERE is_active) AS active_listings,
                (SELECT COUNT(*) FROM bookings) AS total_bookings,
                (SELECT COUNT(*) FROM bookings WHERE status = 'pending') AS pending_bookings,
                (SELECT COUNT(*) FROM bookings WHERE status = 'completed') AS completed_bookings,
                (SELECT COUNT(*) FROM complaints WHERE status IN ('open', 'under_review')) AS open_complaints"#,
        )
        .fetch_one(&self.pool)
        .await?)
    }

    async fn dashboard_financials(&self) -> AppResult<DashboardFinancials> {
        Ok(sqlx::query_as::<_, DashboardFinancials>(
            r#"SELECT
                COALESCE((SELECT SUM(amount) FROM payments WHERE payment_status = 'completed'), 0) AS total_revenue,
                COALESCE((SELECT SUM(commission_amount) FROM payments WHERE payment_status = 'completed'), 0) AS total_commission,
                COALESCE((SELECT SUM(amount) FROM commissions WHERE status = 'collected'), 0) AS collected_commission,
                COALESCE((SELECT SUM(amount) FROM commissions WHERE status = 'pending'), 0) AS pending_commission"#,
        )
        .fetch_one(&self.pool)
        .await?)
    }

    // ─── Settings ─────────────────────────────────────────────────────────────

    async fn get_or_create_settings(&self, defaults: &Settings) -> AppResult<Settings> {
        sqlx::query(
            r#"INSERT INTO settings (id, general, commission, notifications, security, version, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, NOW())
               ON CONFLICT (id) DO NOTHING"#,
        )
        .bind(Settings::SINGLETON_ID)
        .bind(Json(&defaults.general))
        .bind(Json(&defaults.commission))
        .bind(Json(&defaults.notifications))
        .bind(Json(&defaults.security))
        .bind(defaults.version)
        .execute(&self.pool)
        .await?;

        Ok(sqlx::query_as::<_, Settings>("SELECT * FROM settings WHERE id = $1")
            .bind(Settings::SINGLETON_ID)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_settings(
        &self,
        update: &UpdateSettingsRequest,
        updated_by: Uuid,
    ) -> AppResult<Option<Settings>> {
        Ok(sqlx::query_as::<_, Settings>(
            r#"UPDATE settings
               SET general = COALESCE($3, general),
                   commission = COALESCE($4, commission),
                   notifications = COALESCE($5, notifications),
                   security = COALESCE($6, security),
                   version = version + 1,
                   updated_by = $7,
                   updated_at = NOW()
               WHERE id = $1 AND version = $2
               RETURNING *"#,
        )
        .bind(Settings::SINGLETON_ID)
        .bind(update.version)
        .bind(update.general.as_ref().map(Json))
        .bind(update.commission.as_ref().map(Json))
        .bind(update.notifications.as_ref().map(Json))
        .bind(update.security.as_ref().map(Json))
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await?)
    }
}
