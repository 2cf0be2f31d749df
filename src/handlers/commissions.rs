// src/handlers/commissions.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    models::{
        AdminEarnings, Commission, CommissionQuery, EarningsQuery, PageQuery,
        UpdateCommissionRequest,
    },
    response::ApiResponse,
    services::commission,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/commissions",
    params(CommissionQuery, PageQuery),
    responses(
        (status = 200, description = "Commissions, newest first", body = [Commission]),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Commissions"
)]
pub async fn list_commissions(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CommissionQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<Commission>>> {
    let (commissions, pagination) = commission::list(&state, &auth, query, page).await?;
    Ok(ApiResponse::paginated(commissions, pagination))
}

#[utoipa::path(
    get,
    path = "/api/commissions/provider/{provider_id}",
    params(("provider_id" = Uuid, Path, description = "Service provider ID")),
    responses(
        (status = 200, description = "The provider's commissions", body = [Commission]),
        (status = 403, description = "Not this provider"),
    ),
    security(("bearer_auth" = [])),
    tag = "Commissions"
)]
pub async fn provider_commissions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<Commission>>> {
    Ok(ApiResponse::ok(
        commission::list_for_provider(&state, &auth, provider_id).await?,
    ))
}

/// Daily buckets of collected commission
#[utoipa::path(
    get,
    path = "/api/commissions/earnings",
    params(EarningsQuery),
    responses(
        (status = 200, description = "Earnings buckets, newest day first", body = [AdminEarnings]),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Commissions"
)]
pub async fn admin_earnings(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<EarningsQuery>,
) -> AppResult<ApiResponse<Vec<AdminEarnings>>> {
    Ok(ApiResponse::ok(commission::earnings(&state, &auth, query).await?))
}

/// Collect or refund a pending commission
#[utoipa::path(
    put,
    path = "/api/commissions/{id}",
    params(("id" = Uuid, Path, description = "Commission ID")),
    request_body = UpdateCommissionRequest,
    responses(
        (status = 200, description = "Commission updated", body = Commission),
        (status = 400, description = "Commission already settled"),
        (status = 404, description = "Commission not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Commissions"
)]
pub async fn update_commission(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCommissionRequest>,
) -> AppResult<ApiResponse<Commission>> {
    Ok(ApiResponse::ok(commission::update(&state, &auth, id, body).await?))
}
