//! Request extractors
//!
//! - `CurrentUser`: resolves `Authorization: Bearer <token>` to an account
//! - `AdminUser`: `CurrentUser` that must have `is_admin`
//! - `LoginCredentials`: login body as JSON or an OAuth2 password form
//! - `ApiJson` / `ApiQuery`: `Json` and `Query` whose rejections use the
//!   JSON error body

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts},
    Form, Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::api::dto::{LoginForm, LoginRequest};
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::auth::{self, AuthError};
use crate::store::User;

/// The authenticated account
pub struct CurrentUser(pub User);

/// The authenticated account, known to be an administrator
pub struct AdminUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized(AuthError::InvalidToken.to_string()))?;
        let user = auth::user_from_token(&state.store, &state.tokens, token)?;
        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(user_id = user.user_id, "Non-admin requested admin route");
            return Err(ApiError::Forbidden("Not enough permissions".to_string()));
        }
        Ok(AdminUser(user))
    }
}

/// Email and password from either login body format
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[async_trait]
impl<S> FromRequest<S> for LoginCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(body) = Json::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(e.body_text()))?;
            Ok(Self {
                email: body.email,
                password: body.password,
            })
        } else {
            let Form(form) = Form::<LoginForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(e.body_text()))?;
            Ok(Self {
                email: form.username,
                password: form.password,
            })
        }
    }
}

/// JSON body; malformed or incomplete bodies become a 400 `validation_error`
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Ok(ApiJson(body))
    }
}

/// Query string; unknown enum values and bad numbers become a 400
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Ok(ApiQuery(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/api/auth/me");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("bearer  abc "))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
