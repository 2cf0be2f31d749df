// src/handlers/reports.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    models::{
        CreateReportRequest, CustomersReport, PageQuery, ProvidersReport, Report, ReportQuery,
        RevenueReport, StatusBreakdownReport,
    },
    response::ApiResponse,
    services::report,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

// ─── Ad-hoc views ─────────────────────────────────────────────────────────────

/// Revenue and commission over completed payments
#[utoipa::path(
    get,
    path = "/api/reports/revenue",
    params(ReportQuery),
    responses(
        (status = 200, description = "Revenue summary and chart", body = RevenueReport),
        (status = 400, description = "Invalid date window"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn revenue_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<ApiResponse<RevenueReport>> {
    Ok(ApiResponse::ok(report::revenue(&state, &auth, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/reports/bookings",
    params(ReportQuery),
    responses((status = 200, description = "Bookings by status", body = StatusBreakdownReport)),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn bookings_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<ApiResponse<StatusBreakdownReport>> {
    Ok(ApiResponse::ok(report::bookings(&state, &auth, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/reports/providers",
    params(ReportQuery),
    responses((status = 200, description = "Provider signups and top earners", body = ProvidersReport)),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn providers_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<ApiResponse<ProvidersReport>> {
    Ok(ApiResponse::ok(report::providers(&state, &auth, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/reports/customers",
    params(ReportQuery),
    responses((status = 200, description = "Customer signups", body = CustomersReport)),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn customers_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<ApiResponse<CustomersReport>> {
    Ok(ApiResponse::ok(report::customers(&state, &auth, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/reports/complaints",
    params(ReportQuery),
    responses((status = 200, description = "Complaints by status", body = StatusBreakdownReport)),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn complaints_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<ApiResponse<StatusBreakdownReport>> {
    Ok(ApiResponse::ok(report::complaints(&state, &auth, query).await?))
}

// ─── Saved reports ────────────────────────────────────────────────────────────

/// Generate and store a report snapshot
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report generated", body = Report),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn create_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateReportRequest>,
) -> AppResult<ApiResponse<Report>> {
    Ok(ApiResponse::created(report::generate(&state, &auth, body).await?))
}

#[utoipa::path(
    get,
    path = "/api/reports",
    params(PageQuery),
    responses((status = 200, description = "Saved reports, newest first", body = [Report])),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn list_reports(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<Report>>> {
    let (reports, pagination) = report::list(&state, &auth, page).await?;
    Ok(ApiResponse::paginated(reports, pagination))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report", body = Report),
        (status = 404, description = "Report not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn get_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Report>> {
    Ok(ApiResponse::ok(report::get(&state, &auth, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 404, description = "Report not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn delete_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    report::delete(&state, &auth, id).await?;
    Ok(ApiResponse::message("Report deleted"))
}
