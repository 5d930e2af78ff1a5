//! Auth Routes
//!
//! - POST /api/auth/register - Create an account
//! - POST /api/auth/login - Exchange credentials for an access token
//! - GET /api/auth/me - Current account

use axum::{extract::State, Json};
use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::api::dto::{RegisterRequest, TokenResponse, UserResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, CurrentUser, LoginCredentials};
use crate::api::run_blocking;
use crate::api::state::AppState;
use crate::auth;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_FULL_NAME_LEN: usize = 2;

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    validate_email(&req.email)?;
    validate_full_name(&req.full_name)?;
    validate_phone(req.phone.as_deref())?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    let store = state.store.clone();
    let user = run_blocking(move || {
        Ok(auth::register(
            &store,
            &req.email,
            &req.full_name,
            req.phone,
            &req.password,
            false,
        )?)
    })
    .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/auth/login
///
/// Accepts JSON `{email, password}` or a form with `username`/`password`.
pub async fn login(
    State(state): State<Arc<AppState>>,
    credentials: LoginCredentials,
) -> ApiResult<Json<TokenResponse>> {
    let store = state.store.clone();
    let user = run_blocking(move || {
        Ok(auth::authenticate(
            &store,
            &credentials.email,
            &credentials.password,
        )?)
    })
    .await?;

    let access_token = state.tokens.issue(&user.email)?;
    tracing::info!(user_id = user.user_id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

// ============================================
// Shared validators
// ============================================

pub(crate) fn validate_email(email: &str) -> ApiResult<()> {
    if !auth::is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_full_name(full_name: &str) -> ApiResult<()> {
    if full_name.trim().chars().count() < MIN_FULL_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "Full name must be at least {} characters long",
            MIN_FULL_NAME_LEN
        )));
    }
    Ok(())
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^[\d\s()+-]{7,}$").expect("valid phone regex"))
}

/// Blank phone is allowed and means "no phone"
pub(crate) fn validate_phone(phone: Option<&str>) -> ApiResult<()> {
    match phone.map(str::trim) {
        Some(p) if !p.is_empty() && !phone_regex().is_match(p) => {
            Err(ApiError::Validation("Invalid phone number".to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validators() {
        assert!(validate_email("reader@example.com").is_ok());
        assert!(validate_email("reader.example.com").is_err());

        assert!(validate_full_name("Al").is_ok());
        assert!(validate_full_name(" A ").is_err());

        assert!(validate_phone(None).is_ok());
        assert!(validate_phone(Some("  ")).is_ok());
        assert!(validate_phone(Some("+7 (900) 123-45-67")).is_ok());
        assert!(validate_phone(Some("12-34")).is_err());
        assert!(validate_phone(Some("call me maybe")).is_err());
    }
}
