// src/services/settings.rs

use crate::{
    auth::{AuthUser, require_admin},
    errors::{AppError, AppResult},
    models::{Settings, UpdateSettingsRequest},
    services::pricing::PricingService,
    state::AppState,
};
use rust_decimal::Decimal;
use tracing::info;

/// The singleton, created from config defaults on first access.
pub async fn current(state: &AppState) -> AppResult<Settings> {
    let defaults = Settings::defaults(
        state.config.default_commission_rate,
        &state.config.payment_currency,
        state.config.jwt_expiry_hours,
    );
    state.store.get_or_create_settings(&defaults).await
}

pub async fn update(
    state: &AppState,
    user: &AuthUser,
    req: UpdateSettingsRequest,
) -> AppResult<Settings> {
    require_admin(user)?;

    if let Some(commission) = &req.commission {
        PricingService::validate_rate(commission.default_rate)?;
        if commission.minimum_payout < Decimal::ZERO {
            return Err(AppError::Validation(
                "Minimum payout cannot be negative".to_string(),
            ));
        }
    }
    if let Some(security) = &req.security {
        if security.password_min_length < 6 {
            return Err(AppError::Validation(
                "Password minimum length cannot be below 6".to_string(),
            ));
        }
        if security.session_timeout_hours <= 0 {
            return Err(AppError::Validation(
                "Session timeout must be positive".to_string(),
            ));
        }
    }

    // the row must exist before a compare-and-set can match it
    current(state).await?;

    let updated = state
        .store
        .update_settings(&req, user.id)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(
                "Settings were changed by another update; reload and try again".to_string(),
            )
        })?;

    info!("Settings updated to version {} by {}", updated.version, user.id);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{CommissionSettings, UserRole},
        test_support::{TestApp, auth_user},
    };
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_first_read_creates_defaults() {
        let app = TestApp::new();
        let settings = current(&app.state).await.unwrap();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.commission.default_rate, dec!(10));
        assert_eq!(current(&app.state).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_versioned_update_rejects_stale_writer() {
        let app = TestApp::new();
        let admin = auth_user(UserRole::Admin);
        current(&app.state).await.unwrap();

        let commission = CommissionSettings {
            default_rate: dec!(12.5),
            minimum_payout: dec!(100),
        };
        let first = update(
            &app.state,
            &admin,
            UpdateSettingsRequest {
                version: 1,
                commission: Some(commission.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(first.version, 2);
        assert_eq!(first.commission, commission);
        // untouched sections survive
        assert!(first.notifications.email_on_payment);

        let stale = update(
            &app.state,
            &admin,
            UpdateSettingsRequest {
                version: 1,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(stale, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_only_admin_may_update() {
        let app = TestApp::new();
        let customer = auth_user(UserRole::Customer);
        let result = update(&app.state, &customer, UpdateSettingsRequest::default()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_rate_is_rejected() {
        let app = TestApp::new();
        let admin = auth_user(UserRole::Admin);
        let result = update(
            &app.state,
            &admin,
            UpdateSettingsRequest {
                version: 1,
                commission: Some(CommissionSettings {
                    default_rate: dec!(150),
                    minimum_payout: Decimal::ZERO,
                }),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
