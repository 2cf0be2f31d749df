// src/middleware.rs

use crate::{errors::AppError, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Rejects API requests up front while the database is unreachable.
pub async fn require_database(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.store.is_connected() {
        warn!("Rejecting {} {}: database not connected", request.method(), request.uri().path());
        return AppError::ServiceUnavailable("Database not connected".to_string()).into_response();
    }
    next.run(request).await
}
