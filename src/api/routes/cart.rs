//! Cart Routes
//!
//! All cart routes act on the authenticated user's own cart.
//!
//! - GET /api/cart - Current cart (created on first access)
//! - POST /api/cart/items - Add a book
//! - PATCH /api/cart/items/:id - Change quantity
//! - DELETE /api/cart/items/:id - Remove a line
//! - DELETE /api/cart - Empty the cart

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CartItemRequest, CartItemUpdateRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, CurrentUser};
use crate::api::state::AppState;
use crate::store::{Cart, StoreError};

/// GET /api/cart
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Cart>> {
    Ok(Json(state.store.get_or_create_cart(user.user_id)?))
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<CartItemRequest>,
) -> ApiResult<(StatusCode, Json<Cart>)> {
    let cart = state
        .store
        .add_cart_item(user.user_id, req.book_id, req.quantity)
        .map_err(|e| match e {
            StoreError::NotFound(_) => ApiError::NotFound("Book not found".to_string()),
            other => other.into(),
        })?;
    tracing::debug!(user_id = user.user_id, book_id = req.book_id, "Added to cart");
    Ok((StatusCode::CREATED, Json(cart)))
}

/// PATCH /api/cart/items/:id
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(cart_item_id): Path<i64>,
    ApiJson(req): ApiJson<CartItemUpdateRequest>,
) -> ApiResult<Json<Cart>> {
    let cart = state
        .store
        .update_cart_item(user.user_id, cart_item_id, req.quantity)?;
    Ok(Json(cart))
}

/// DELETE /api/cart/items/:id
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(cart_item_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.remove_cart_item(user.user_id, cart_item_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/cart
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<StatusCode> {
    state.store.clear_cart(user.user_id)?;
    Ok(StatusCode::NO_CONTENT)
}
