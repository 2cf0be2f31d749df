// src/services/report.rs

//! Report aggregation.
//!
//! Each view loads every row of its window and reduces it in memory. The
//! reducers are pure so they can be tested without a store.

use crate::{
    auth::{AuthUser, require_admin},
    errors::{AppError, AppResult},
    models::*,
    services::pricing::money,
    state::AppState,
    store::TimeWindow,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

const TOP_PROVIDERS: usize = 5;

/// Bucket key for `at`: `2023-01-05`, `2023-W01`, `2023-01` or `2023`.
pub fn period_key(at: DateTime<Utc>, time_frame: TimeFrame) -> String {
    let pattern = match time_frame {
        TimeFrame::Daily => "%Y-%m-%d",
        TimeFrame::Weekly => "%G-W%V",
        TimeFrame::Monthly => "%Y-%m",
        TimeFrame::Yearly => "%Y",
    };
    at.format(pattern).to_string()
}

/// Display name of a status as it appears on the wire.
fn status_name<S: Serialize + std::fmt::Debug>(status: &S) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{status:?}"))
}

fn count_chart<T>(
    rows: &[T],
    created_at: impl Fn(&T) -> DateTime<Utc>,
    time_frame: TimeFrame,
) -> Vec<CountPoint> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        *buckets.entry(period_key(created_at(row), time_frame)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(period, count)| CountPoint { period, count })
        .collect()
}

fn count_by<T, K: Serialize + std::fmt::Debug>(
    rows: &[T],
    key: impl Fn(&T) -> K,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(status_name(&key(row))).or_default() += 1;
    }
    counts
}

// ─── Reducers ─────────────────────────────────────────────────────────────────

/// Totals and chart over completed payments; other statuses are ignored.
pub fn revenue_report(payments: &[Payment], time_frame: TimeFrame) -> RevenueReport {
    let completed: Vec<&Payment> = payments
        .iter()
        .filter(|p| p.payment_status == PaymentStatus::Completed)
        .collect();

    let total_revenue: Decimal = completed.iter().map(|p| p.amount).sum();
    let total_commission: Decimal = completed.iter().map(|p| p.commission_amount).sum();
    let total_provider_earnings: Decimal = completed.iter().map(|p| p.provider_amount).sum();
    let average_revenue = if completed.is_empty() {
        Decimal::ZERO
    } else {
        money(total_revenue / Decimal::from(completed.len()))
    };

    let mut chart: BTreeMap<String, RevenuePoint> = BTreeMap::new();
    for payment in &completed {
        let period = period_key(payment.created_at, time_frame);
        let point = chart.entry(period.clone()).or_insert_with(|| RevenuePoint {
            period,
            revenue: Decimal::ZERO,
            commission: Decimal::ZERO,
            count: 0,
        });
        point.revenue += payment.amount;
        point.commission += payment.commission_amount;
        point.count += 1;
    }

    RevenueReport {
        summary: RevenueSummary {
            total_revenue,
            total_commission,
            total_provider_earnings,
            total_payments: completed.len(),
            average_revenue,
        },
        chart_data: chart.into_values().collect(),
    }
}

/// Cancelled and rejected bookings are counted but carry no value.
pub fn bookings_report(bookings: &[Booking], time_frame: TimeFrame) -> StatusBreakdownReport {
    StatusBreakdownReport {
        total: bookings.len(),
        by_status: count_by(bookings, |b| b.status),
        total_value: bookings
            .iter()
            .filter(|b| !matches!(b.status, BookingStatus::Cancelled | BookingStatus::Rejected))
            .map(|b| b.total_amount)
            .sum(),
        chart_data: count_chart(bookings, |b| b.created_at, time_frame),
    }
}

pub fn complaints_report(complaints: &[Complaint], time_frame: TimeFrame) -> StatusBreakdownReport {
    StatusBreakdownReport {
        total: complaints.len(),
        by_status: count_by(complaints, |c| c.status),
        total_value: Decimal::ZERO,
        chart_data: count_chart(complaints, |c| c.created_at, time_frame),
    }
}

pub fn providers_report(providers: &[ServiceProvider], time_frame: TimeFrame) -> ProvidersReport {
    let mut ranked: Vec<&ServiceProvider> = providers.iter().collect();
    ranked.sort_by(|a, b| b.total_earnings.cmp(&a.total_earnings));

    ProvidersReport {
        total: providers.len(),
        by_status: count_by(providers, |p| p.verification_status),
        top_providers: ranked
            .into_iter()
            .take(TOP_PROVIDERS)
            .map(|p| TopProvider {
                provider_id: p.id,
                business_name: p.business_name.clone(),
                total_earnings: p.total_earnings,
                total_commission_paid: p.total_commission_paid,
            })
            .collect(),
        chart_data: count_chart(providers, |p| p.created_at, time_frame),
    }
}

pub fn customers_report(customers: &[User], time_frame: TimeFrame) -> CustomersReport {
    let active = customers.iter().filter(|u| u.is_active).count();
    CustomersReport {
        total: customers.len(),
        active,
        inactive: customers.len() - active,
        chart_data: count_chart(customers, |u| u.created_at, time_frame),
    }
}

/// One point per day for the `days` days ending on `today`, zero-filled.
pub fn daily_revenue(payments: &[Payment], today: NaiveDate, days: i64) -> Vec<RevenuePoint> {
    let report = revenue_report(payments, TimeFrame::Daily);
    let mut by_day: BTreeMap<String, RevenuePoint> = report
        .chart_data
        .into_iter()
        .map(|p| (p.period.clone(), p))
        .collect();

    (0..days)
        .rev()
        .map(|back| {
            let period = (today - Duration::days(back)).format("%Y-%m-%d").to_string();
            by_day.remove(&period).unwrap_or(RevenuePoint {
                period,
                revenue: Decimal::ZERO,
                commission: Decimal::ZERO,
                count: 0,
            })
        })
        .collect()
}

// ─── Ad-hoc views ─────────────────────────────────────────────────────────────

fn window(start: NaiveDate, end: NaiveDate) -> AppResult<TimeWindow> {
    if start > end {
        return Err(AppError::Validation(
            "startDate must not be after endDate".to_string(),
        ));
    }
    Ok(TimeWindow::from_dates(start, end))
}

pub async fn revenue(state: &AppState, auth: &AuthUser, q: ReportQuery) -> AppResult<RevenueReport> {
    require_admin(auth)?;
    let payments = state.store.payments_between(window(q.start_date, q.end_date)?).await?;
    Ok(revenue_report(&payments, q.time_frame))
}

pub async fn bookings(
    state: &AppState,
    auth: &AuthUser,
    q: ReportQuery,
) -> AppResult<StatusBreakdownReport> {
    require_admin(auth)?;
    let rows = state.store.bookings_between(window(q.start_date, q.end_date)?).await?;
    Ok(bookings_report(&rows, q.time_frame))
}

pub async fn providers(state: &AppState, auth: &AuthUser, q: ReportQuery) -> AppResult<ProvidersReport> {
    require_admin(auth)?;
    let rows = state
        .store
        .providers_created_between(window(q.start_date, q.end_date)?)
        .await?;
    Ok(providers_report(&rows, q.time_frame))
}

pub async fn customers(state: &AppState, auth: &AuthUser, q: ReportQuery) -> AppResult<CustomersReport> {
    require_admin(auth)?;
    let rows = state
        .store
        .users_created_between(UserRole::Customer, window(q.start_date, q.end_date)?)
        .await?;
    Ok(customers_report(&rows, q.time_frame))
}

pub async fn complaints(
    state: &AppState,
    auth: &AuthUser,
    q: ReportQuery,
) -> AppResult<StatusBreakdownReport> {
    require_admin(auth)?;
    let rows = state.store.complaints_between(window(q.start_date, q.end_date)?).await?;
    Ok(complaints_report(&rows, q.time_frame))
}

// ─── Saved reports ────────────────────────────────────────────────────────────

fn to_json<T: Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

/// Runs the requested aggregation and stores it as an immutable snapshot.
pub async fn generate(
    state: &AppState,
    auth: &AuthUser,
    req: CreateReportRequest,
) -> AppResult<Report> {
    require_admin(auth)?;
    let span = window(req.start_date, req.end_date)?;
    let tf = req.time_frame;

    // every snapshot carries the window's money totals
    let payments = state.store.payments_between(span).await?;
    let revenue = revenue_report(&payments, tf);

    let data = match req.report_type {
        ReportType::Revenue => to_json(&revenue)?,
        ReportType::Bookings => to_json(&bookings_report(&state.store.bookings_between(span).await?, tf))?,
        ReportType::Providers => to_json(&providers_report(
            &state.store.providers_created_between(span).await?,
            tf,
        ))?,
        ReportType::Customers => to_json(&customers_report(
            &state.store.users_created_between(UserRole::Customer, span).await?,
            tf,
        ))?,
        ReportType::Complaints => to_json(&complaints_report(
            &state.store.complaints_between(span).await?,
            tf,
        ))?,
        ReportType::Custom => json!({
            "revenue": to_json(&revenue)?,
            "bookings": to_json(&bookings_report(&state.store.bookings_between(span).await?, tf))?,
            "complaints": to_json(&complaints_report(&state.store.complaints_between(span).await?, tf))?,
        }),
    };

    let title = req
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            format!(
                "{:?} report {} to {}",
                req.report_type, req.start_date, req.end_date
            )
        });

    let report = Report {
        id: Uuid::new_v4(),
        report_type: req.report_type,
        title,
        time_frame: tf,
        start_date: span.start,
        end_date: span.end,
        data,
        total_revenue: revenue.summary.total_revenue,
        total_commission: revenue.summary.total_commission,
        generated_by: auth.id,
        created_at: Utc::now(),
    };

    let report = state.store.insert_report(&report).await?;
    info!("Report {} ({:?}) generated by {}", report.id, report.report_type, auth.id);
    Ok(report)
}

pub async fn list(
    state: &AppState,
    auth: &AuthUser,
    page: PageQuery,
) -> AppResult<(Vec<Report>, Pagination)> {
    require_admin(auth)?;
    let (reports, total) = state.store.list_reports(page).await?;
    Ok((reports, page.pagination(total)))
}

pub async fn get(state: &AppState, auth: &AuthUser, id: Uuid) -> AppResult<Report> {
    require_admin(auth)?;
    state
        .store
        .find_report(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
}

pub async fn delete(state: &AppState, auth: &AuthUser, id: Uuid) -> AppResult<()> {
    require_admin(auth)?;
    if !state.store.delete_report(id).await? {
        return Err(AppError::NotFound("Report not found".to_string()));
    }
    info!("Report {} deleted by {}", id, auth.id);
    Ok(())
}
