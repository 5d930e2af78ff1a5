//! Order Routes
//!
//! - POST /api/orders - Check out the current cart
//! - GET /api/orders - Own orders, newest first
//! - GET /api/orders/:id - One own order

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::store::Order;

/// POST /api/orders
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state
        .store
        .create_order_from_cart(user.user_id)?
        .ok_or_else(|| ApiError::Validation("Cart is empty".to_string()))?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.store.list_orders_for_user(user.user_id)?))
}

/// GET /api/orders/:id
///
/// Another user's order is reported as missing.
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<Order>> {
    let order = state
        .store
        .get_order(order_id)?
        .filter(|order| order.user_id == user.user_id)
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;
    Ok(Json(order))
}
