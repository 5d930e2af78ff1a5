//! Admin Routes
//!
//! Every route here requires an administrator.
//!
//! - GET|POST /api/admin/genres, PUT|PATCH|DELETE /api/admin/genres/:id
//! - GET|POST /api/admin/authors, PUT|PATCH|DELETE /api/admin/authors/:id
//! - GET|POST /api/admin/publishers, PUT|PATCH|DELETE /api/admin/publishers/:id
//! - GET /api/admin/users, PATCH /api/admin/users/:id
//! - GET /api/admin/orders, GET /api/admin/orders/:id
//! - PATCH /api/admin/orders/:id/status
//! - POST /api/admin/books/:id/cover

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::dto::{
    AdminFlagRequest, AdminUserResponse, CoverUploadRequest, DictEntryRequest, OrderStatusRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{AdminUser, ApiJson};
use crate::api::state::AppState;
use crate::store::{Book, DictKind, Order, OrderStatus};

// ============================================
// Dictionaries
// ============================================

/// Serialize an entry with the id/name keys its kind uses on the wire
fn dict_json(kind: DictKind, id: i64, name: String) -> Value {
    match kind {
        DictKind::Genre => json!({ "genre_id": id, "name": name }),
        DictKind::Author => json!({ "author_id": id, "full_name": name }),
        DictKind::Publisher => json!({ "publisher_id": id, "name": name }),
    }
}

/// GET /api/admin/{genres,authors,publishers}
pub async fn list_dict(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Extension(kind): Extension<DictKind>,
) -> ApiResult<Json<Vec<Value>>> {
    let entries = state
        .store
        .list_dict(kind)?
        .into_iter()
        .map(|(id, name)| dict_json(kind, id, name))
        .collect();
    Ok(Json(entries))
}

/// POST /api/admin/{genres,authors,publishers}
pub async fn create_dict(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Extension(kind): Extension<DictKind>,
    ApiJson(req): ApiJson<DictEntryRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let (id, name) = state.store.create_dict(kind, &req.name)?;
    tracing::info!(kind = kind.label(), id, admin_id = admin.user_id, "Created dictionary entry");
    Ok((StatusCode::CREATED, Json(dict_json(kind, id, name))))
}

/// PUT|PATCH /api/admin/{genres,authors,publishers}/:id
pub async fn rename_dict(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Extension(kind): Extension<DictKind>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<DictEntryRequest>,
) -> ApiResult<Json<Value>> {
    let (id, name) = state.store.rename_dict(kind, id, &req.name)?;
    tracing::info!(kind = kind.label(), id, admin_id = admin.user_id, "Renamed dictionary entry");
    Ok(Json(dict_json(kind, id, name)))
}

/// DELETE /api/admin/{genres,authors,publishers}/:id
pub async fn delete_dict(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Extension(kind): Extension<DictKind>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.delete_dict(kind, id)?;
    tracing::info!(kind = kind.label(), id, admin_id = admin.user_id, "Deleted dictionary entry");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================
// Users
// ============================================

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> ApiResult<Json<Vec<AdminUserResponse>>> {
    let users = state.store.list_users()?;
    Ok(Json(users.iter().map(AdminUserResponse::from).collect()))
}

/// PATCH /api/admin/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<i64>,
    ApiJson(req): ApiJson<AdminFlagRequest>,
) -> ApiResult<Json<AdminUserResponse>> {
    let user = state.store.set_admin(user_id, req.is_admin)?;
    tracing::info!(
        user_id,
        is_admin = req.is_admin,
        admin_id = admin.user_id,
        "Changed admin flag"
    );
    Ok(Json(AdminUserResponse::from(&user)))
}

// ============================================
// Orders
// ============================================

/// GET /api/admin/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.store.list_all_orders()?))
}

/// GET /api/admin/orders/:id
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<Order>> {
    let order = state
        .store
        .get_order(order_id)?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;
    Ok(Json(order))
}

/// PATCH /api/admin/orders/:id/status
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(order_id): Path<i64>,
    ApiJson(req): ApiJson<OrderStatusRequest>,
) -> ApiResult<Json<Order>> {
    let status: OrderStatus = req.status.parse().map_err(ApiError::Validation)?;
    let order = state.store.update_order_status(order_id, status)?;
    tracing::info!(order_id, status = %status, admin_id = admin.user_id, "Changed order status");
    Ok(Json(order))
}

// ============================================
// Covers
// ============================================

/// POST /api/admin/books/:id/cover
///
/// Body: `{filename, content}` with base64 content.
pub async fn upload_cover(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(book_id): Path<i64>,
    ApiJson(req): ApiJson<CoverUploadRequest>,
) -> ApiResult<Json<Book>> {
    if state.store.get_book(book_id)?.is_none() {
        return Err(ApiError::NotFound("Book not found".to_string()));
    }

    let bytes = state.covers.decode(&req.content)?;
    let public_path = state.covers.save(book_id, &req.filename, &bytes).await?;

    let (book, previous) = state.store.set_cover(book_id, &public_path)?;
    if let Some(previous) = previous.filter(|p| *p != public_path) {
        state.covers.remove(&previous).await;
    }

    tracing::info!(book_id, admin_id = admin.user_id, "Uploaded cover");
    Ok(Json(book))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_json_keys() {
        assert_eq!(
            dict_json(DictKind::Author, 3, "Ann Roe".into()),
            json!({ "author_id": 3, "full_name": "Ann Roe" })
        );
        assert_eq!(
            dict_json(DictKind::Genre, 1, "Poetry".into()),
            json!({ "genre_id": 1, "name": "Poetry" })
        );
    }
}
