use crate::{
    errors::{AppError, AppResult},
    models::{Claims, UserRole},
    state::AppState,
};
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{HeaderMap, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

/// Authenticated requester extractor.
/// Add `auth: AuthUser` as a parameter in any handler that requires authentication.
/// The token must be valid and its account must still exist and be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
    /// Set for service providers so ownership checks need no lookup
    pub provider_id: Option<Uuid>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers: &HeaderMap = &parts.headers;

        let auth_header = headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization format".to_string()))?;

        let user = decode_token(token, &state.config.jwt_secret)?;

        // Tokens outlive deactivation, so the account is re-checked on every request
        let account = state
            .store
            .find_user(user.id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
        if !account.is_active {
            return Err(AppError::Forbidden(
                "This account has been deactivated".to_string(),
            ));
        }

        Ok(user)
    }
}

/// `Option<AuthUser>` for routes that are public but show more to signed-in users.
/// A present but invalid token is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key("Authorization") {
            return Ok(None);
        }
        <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

pub fn decode_token(token: &str, secret: &str) -> AppResult<AuthUser> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    let claims = token_data.claims;
    let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
    let role = UserRole::parse(&claims.role).ok_or(AppError::InvalidToken)?;
    let provider_id = claims
        .provider_id
        .as_deref()
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| AppError::InvalidToken)?;

    Ok(AuthUser {
        id,
        role,
        provider_id,
    })
}

pub fn generate_token(
    user_id: Uuid,
    role: UserRole,
    provider_id: Option<Uuid>,
    secret: &str,
    expiry_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        provider_id: provider_id.map(|id| id.to_string()),
        exp: (now + chrono::Duration::hours(expiry_hours)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

// ─── Authorization ────────────────────────────────────────────────────────────

/// A party that owns a resource, as recorded on the resource itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// A user id, e.g. `Booking.customer_id` or `ServiceProvider.user_id`
    User(Uuid),
    /// A service provider profile id, e.g. `Booking.service_provider_id`
    Provider(Uuid),
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn owns(&self, owner: Owner) -> bool {
        match owner {
            Owner::User(id) => self.id == id,
            Owner::Provider(id) => self.provider_id == Some(id),
        }
    }
}

/// Single capability check for every protected operation.
///
/// Admins always pass. Anyone else must hold one of `roles` (when given) and
/// own at least one of `owners` (when given).
pub fn authorize(user: &AuthUser, owners: &[Owner], roles: &[UserRole]) -> AppResult<()> {
    if user.is_admin() {
        return Ok(());
    }

    if !roles.is_empty() && !roles.contains(&user.role) {
        return Err(AppError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role.as_str()
        )));
    }

    if !owners.is_empty() && !owners.iter().any(|owner| user.owns(*owner)) {
        return Err(AppError::Forbidden(
            "Not authorized to access this resource".to_string(),
        ));
    }

    Ok(())
}

pub fn require_admin(user: &AuthUser) -> AppResult<()> {
    authorize(user, &[], &[UserRole::Admin])
}

/// Provider profile id of the requester, or `Forbidden` for non-providers.
pub fn require_provider(user: &AuthUser) -> AppResult<Uuid> {
    authorize(user, &[], &[UserRole::ServiceProvider])?;
    user.provider_id
        .ok_or_else(|| AppError::Forbidden("No service provider profile for this account".into()))
}
