// src/services/auth.rs

use crate::{
    auth::{AuthUser, generate_token},
    errors::{AppError, AppResult},
    models::*,
    services::{email::EmailService, settings},
    state::AppState,
};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const RESET_TOKEN_MINUTES: i64 = 10;

pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_password(password: &str, settings: &Settings) -> AppResult<()> {
    let min = settings.security.password_min_length as usize;
    if password.chars().count() < min {
        return Err(AppError::Validation(format!(
            "Password must be at least {min} characters"
        )));
    }
    Ok(())
}

async fn session_for(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let provider_id = match user.role {
        UserRole::ServiceProvider => state
            .store
            .find_provider_by_user(user.id)
            .await?
            .map(|p| p.id),
        _ => None,
    };
    let hours = settings::current(state).await?.security.session_timeout_hours;
    let token = generate_token(user.id, user.role, provider_id, &state.config.jwt_secret, hours)?;
    Ok(AuthResponse { token, user })
}

pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<AuthResponse> {
    let name = req.name.trim().to_string();
    let email = normalize_email(&req.email);
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }

    let settings = settings::current(state).await?;
    check_password(&req.password, &settings)?;

    let role = req.role.unwrap_or(UserRole::Customer);
    if role == UserRole::Admin {
        return Err(AppError::Forbidden(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "User already exists with this email".to_string(),
        ));
    }

    let password_hash = hash(&req.password, state.config.bcrypt_cost)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        phone: req.phone,
        password_hash,
        role,
        is_active: true,
        address: req.address.unwrap_or_default(),
        reset_token_hash: None,
        reset_token_expires_at: None,
        created_at: now,
        updated_at: now,
    };

    let provider = match role {
        UserRole::ServiceProvider => {
            let business_name = req
                .business_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .ok_or_else(|| {
                    AppError::Validation("Business name is required for providers".to_string())
                })?;
            for category_id in &req.category_ids {
                if state.store.find_category(*category_id).await?.is_none() {
                    return Err(AppError::NotFound(format!(
                        "Category {category_id} not found"
                    )));
                }
            }
            Some(ServiceProvider {
                id: Uuid::new_v4(),
                user_id: user.id,
                business_name,
                description: req.description,
                verification_status: VerificationStatus::Pending,
                commission_rate: None,
                total_earnings: Decimal::ZERO,
                total_commission_paid: Decimal::ZERO,
                category_ids: req.category_ids,
                created_at: now,
                updated_at: now,
            })
        }
        _ => None,
    };

    // the unique index still catches a concurrent duplicate
    let user = state.store.insert_user(&user, provider.as_ref()).await?;
    info!("Registered {} account {}", user.role.as_str(), user.id);

    session_for(state, user).await
}

pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<AuthResponse> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .store
        .find_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    let valid =
        verify(&req.password, &user.password_hash).map_err(|e| AppError::Internal(e.to_string()))?;
    if !valid {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(AppError::Forbidden(
            "This account has been deactivated".to_string(),
        ));
    }

    session_for(state, user).await
}

pub async fn me(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    state
        .store
        .find_user(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn update_profile(
    state: &AppState,
    auth: &AuthUser,
    req: UpdateProfileRequest,
) -> AppResult<User> {
    let mut user = me(state, auth).await?;

    if let Some(name) = req.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }
        user.name = name;
    }
    if let Some(phone) = req.phone {
        user.phone = Some(phone);
    }
    if let Some(address) = req.address {
        user.address = address;
    }

    state.store.save_user(&user).await
}

/// Stores a hashed single-use token and mails the raw one. A failed send
/// clears the token again so no unusable reset stays pending.
pub async fn forgot_password(state: &AppState, req: ForgotPasswordRequest) -> AppResult<()> {
    let mut user = state
        .store
        .find_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(|| AppError::NotFound("There is no user with that email".to_string()))?;

    let token = hex::encode(rand::random::<[u8; 32]>());
    user.reset_token_hash = Some(hash_reset_token(&token));
    user.reset_token_expires_at = Some(Utc::now() + Duration::minutes(RESET_TOKEN_MINUTES));
    let mut user = state.store.save_user(&user).await?;

    let reset_url = format!("{}/reset-password/{}", state.config.client_url, token);
    let email = EmailService::new(Arc::clone(&state.config));

    if let Err(e) = email
        .send_password_reset(&user.email, &user.name, &reset_url)
        .await
    {
        warn!("Password reset email for {} failed: {}", user.id, e);
        user.reset_token_hash = None;
        user.reset_token_expires_at = None;
        state.store.save_user(&user).await?;
        return Err(e);
    }

    Ok(())
}

pub async fn reset_password(
    state: &AppState,
    token: &str,
    req: ResetPasswordRequest,
) -> AppResult<AuthResponse> {
    let mut user = state
        .store
        .find_user_by_reset_token(&hash_reset_token(token), Utc::now())
        .await?
        .ok_or_else(|| AppError::Validation("Invalid or expired reset token".to_string()))?;

    let settings = settings::current(state).await?;
    check_password(&req.password, &settings)?;

    user.password_hash = hash(&req.password, state.config.bcrypt_cost)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    user.reset_token_hash = None;
    user.reset_token_expires_at = None;
    let user = state.store.save_user(&user).await?;
    info!("Password reset for user {}", user.id);

    session_for(state, user).await
}
