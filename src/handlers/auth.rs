// src/handlers/auth.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    models::{
        AuthResponse, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
        UpdateProfileRequest, User,
    },
    response::ApiResponse,
    services::auth as accounts,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};

/// Register a customer or service provider account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = accounts::register(&state, body).await?;
    Ok(ApiResponse::created(session))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account deactivated"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    Ok(ApiResponse::ok(accounts::login(&state, body).await?))
}

/// Current user's account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> AppResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(accounts::me(&state, &auth).await?))
}

/// Update name, phone or address
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(accounts::update_profile(&state, &auth, body).await?))
}

/// Email a password reset link
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent"),
        (status = 404, description = "No user with that email"),
        (status = 503, description = "Email service not configured"),
    ),
    tag = "Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    accounts::forgot_password(&state, body).await?;
    Ok(ApiResponse::message("Password reset email sent"))
}

/// Set a new password using a reset token
#[utoipa::path(
    put,
    path = "/api/auth/reset-password/{token}",
    params(("token" = String, Path, description = "Token from the reset email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = AuthResponse),
        (status = 400, description = "Invalid or expired token"),
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = accounts::reset_password(&state, &token, body).await?;
    Ok(ApiResponse::ok(session).with_message("Password has been reset"))
}
