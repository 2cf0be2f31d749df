// src/handlers/general.rs

use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

/// Root handler, a landing page with links to the docs and health check
pub async fn root_handler() -> impl IntoResponse {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Fixly API</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 720px; margin: 48px auto; padding: 0 16px; color: #1f2937; }
    h1 { color: #d97706; margin-bottom: 4px; }
    ul { padding-left: 18px; line-height: 1.8; }
    code { background: #f3f4f6; padding: 1px 5px; border-radius: 4px; }
    a { color: #b45309; }
  </style>
</head>
<body>
  <h1>Fixly API</h1>
  <p>Home services marketplace: listings, bookings, payments and commissions.</p>
  <p><a href="/docs">Swagger UI</a> &middot; <a href="/health">Health check</a></p>
  <h2>Route groups</h2>
  <ul>
    <li><code>/api/auth</code> register, login, profile, password reset</li>
    <li><code>/api/categories</code>, <code>/api/listings</code> service catalog</li>
    <li><code>/api/providers</code> provider profile and earnings</li>
    <li><code>/api/bookings</code> booking lifecycle</li>
    <li><code>/api/payments</code> direct and Razorpay payments, settlement</li>
    <li><code>/api/commissions</code> commission collection and daily earnings</li>
    <li><code>/api/complaints</code>, <code>/api/reviews</code> customer feedback</li>
    <li><code>/api/reports</code>, <code>/api/admin</code>, <code>/api/settings</code> administration</li>
  </ul>
</body>
</html>"#)
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "service": "fixly",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string()
            })),
        ),
    }
}
