// src/services/admin.rs

use crate::{
    auth::{AuthUser, require_admin},
    errors::{AppError, AppResult},
    models::*,
    services::report,
    state::AppState,
    store::TimeWindow,
};
use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

const CHART_DAYS: i64 = 7;
const RECENT_BOOKINGS: i64 = 5;

pub async fn dashboard(state: &AppState, auth: &AuthUser) -> AppResult<Dashboard> {
    require_admin(auth)?;

    let today = Utc::now().date_naive();
    let chart_window = TimeWindow::from_dates(today - Duration::days(CHART_DAYS - 1), today);
    let payments = state.store.payments_between(chart_window).await?;

    Ok(Dashboard {
        counts: state.store.dashboard_counts().await?,
        financials: state.store.dashboard_financials().await?,
        revenue_chart: report::daily_revenue(&payments, today, CHART_DAYS),
        recent_bookings: state.store.recent_bookings(RECENT_BOOKINGS).await?,
    })
}

pub async fn list_users(
    state: &AppState,
    auth: &AuthUser,
    query: UserQuery,
    page: PageQuery,
) -> AppResult<(Vec<User>, Pagination)> {
    require_admin(auth)?;
    let (users, total) = state.store.list_users(query.role, page).await?;
    Ok((users, page.pagination(total)))
}

pub async fn set_user_status(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    req: UpdateUserStatusRequest,
) -> AppResult<User> {
    require_admin(auth)?;
    if id == auth.id && !req.is_active {
        return Err(AppError::Validation(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    let mut user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    user.is_active = req.is_active;

    let user = state.store.save_user(&user).await?;
    info!(
        "User {} {} by admin {}",
        user.id,
        if user.is_active { "activated" } else { "deactivated" },
        auth.id
    );
    Ok(user)
}
