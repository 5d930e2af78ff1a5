//! Profile Routes
//!
//! - GET /api/users/me - Profile with addresses
//! - PUT /api/users/me - Update email, name, phone
//! - POST /api/users/me/password - Change password
//! - GET /api/users/me/addresses - List addresses
//! - POST /api/users/me/addresses - Add an address
//! - PUT /api/users/me/addresses/:id - Update an address
//! - DELETE /api/users/me/addresses/:id - Delete an address

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::auth::{validate_email, validate_full_name, validate_phone};
use crate::api::dto::{
    DetailResponse, PasswordChangeRequest, ProfileResponse, ProfileUpdateRequest, UserResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, CurrentUser};
use crate::api::run_blocking;
use crate::api::state::AppState;
use crate::auth;
use crate::store::{Address, AddressPatch, NewAddress, User};

/// GET /api/users/me
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ProfileResponse>> {
    Ok(Json(profile_of(&state, &user)?))
}

/// PUT /api/users/me
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_email(&req.email)?;
    validate_full_name(&req.full_name)?;
    validate_phone(req.phone.as_deref())?;

    let updated = state
        .store
        .update_profile(user.user_id, &req.email, &req.full_name, req.phone)?;
    tracing::info!(user_id = user.user_id, "Updated profile");
    Ok(Json(profile_of(&state, &updated)?))
}

/// POST /api/users/me/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<PasswordChangeRequest>,
) -> ApiResult<Json<DetailResponse>> {
    let store = state.store.clone();
    run_blocking(move || {
        Ok(auth::change_password(
            &store,
            &user,
            &req.current_password,
            &req.new_password,
        )?)
    })
    .await?;

    Ok(Json(DetailResponse {
        detail: "Password updated successfully".to_string(),
    }))
}

/// GET /api/users/me/addresses
pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Address>>> {
    Ok(Json(state.store.list_addresses(user.user_id)?))
}

/// POST /api/users/me/addresses
pub async fn create_address(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<NewAddress>,
) -> ApiResult<(StatusCode, Json<Address>)> {
    validate_address_field("city", &req.city, 2, 255)?;
    validate_address_field("street", &req.street, 2, 255)?;
    validate_address_field("house", &req.house, 1, 50)?;
    validate_address_field("postal_code", &req.postal_code, 3, 20)?;

    let address = state.store.create_address(user.user_id, req)?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// PUT /api/users/me/addresses/:id
pub async fn update_address(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<i64>,
    ApiJson(req): ApiJson<AddressPatch>,
) -> ApiResult<Json<Address>> {
    if let Some(city) = &req.city {
        validate_address_field("city", city, 2, 255)?;
    }
    if let Some(street) = &req.street {
        validate_address_field("street", street, 2, 255)?;
    }
    if let Some(house) = &req.house {
        validate_address_field("house", house, 1, 50)?;
    }
    if let Some(postal_code) = &req.postal_code {
        validate_address_field("postal_code", postal_code, 3, 20)?;
    }

    let address = state.store.update_address(user.user_id, address_id, req)?;
    Ok(Json(address))
}

/// DELETE /api/users/me/addresses/:id
pub async fn delete_address(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.delete_address(user.user_id, address_id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn profile_of(state: &AppState, user: &User) -> ApiResult<ProfileResponse> {
    Ok(ProfileResponse {
        user: UserResponse::from(user),
        addresses: state.store.list_addresses(user.user_id)?,
    })
}

fn validate_address_field(field: &str, value: &str, min: usize, max: usize) -> ApiResult<()> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(ApiError::Validation(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address_field() {
        assert!(validate_address_field("house", "1", 1, 50).is_ok());
        assert!(validate_address_field("house", " ", 1, 50).is_err());
        assert!(validate_address_field("postal_code", "12", 3, 20).is_err());
        assert!(validate_address_field("city", "Омск", 2, 255).is_ok());
        assert!(validate_address_field("city", &"x".repeat(256), 2, 255).is_err());
    }
}
