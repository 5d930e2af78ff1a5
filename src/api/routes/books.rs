//! Book Routes
//!
//! Public catalog reads and admin-only writes.
//!
//! - GET /api/books - Filtered, paginated listing
//! - GET /api/books/:id - Single book
//! - POST /api/books - Create (admin)
//! - PUT /api/books/:id - Update (admin)
//! - DELETE /api/books/:id - Delete (admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{AdminUser, ApiJson, ApiQuery};
use crate::api::state::AppState;
use crate::store::{Book, BookPatch, BookQuery, NewBook};

/// GET /api/books
///
/// Query parameters: `q`, `genre_id`, `author_id`, `publisher_id`,
/// `min_price`, `max_price`, `min_year`, `max_year`, `order_by`,
/// `skip` (default 0), `limit` (default and max 100).
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<BookQuery>,
) -> ApiResult<Json<Vec<Book>>> {
    validate_query(&query)?;
    let books = state.store.list_books(&query)?;
    tracing::debug!(count = books.len(), skip = query.skip, "Listed books");
    Ok(Json(books))
}

/// GET /api/books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<i64>,
) -> ApiResult<Json<Book>> {
    let book = state
        .store
        .get_book(book_id)?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;
    Ok(Json(book))
}

/// POST /api/books
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<NewBook>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let book = state.store.create_book(req)?;
    tracing::info!(book_id = book.book_id, admin_id = admin.user_id, "Created book");
    Ok((StatusCode::CREATED, Json(book)))
}

/// PUT /api/books/:id
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(book_id): Path<i64>,
    ApiJson(req): ApiJson<BookPatch>,
) -> ApiResult<Json<Book>> {
    let book = state.store.update_book(book_id, req)?;
    tracing::info!(book_id, admin_id = admin.user_id, "Updated book");
    Ok(Json(book))
}

/// DELETE /api/books/:id
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(book_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let cover = state
        .store
        .get_book(book_id)?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?
        .cover_image;
    state.store.delete_book(book_id)?;
    if let Some(cover) = cover {
        state.covers.remove(&cover).await;
    }
    tracing::info!(book_id, admin_id = admin.user_id, "Deleted book");
    Ok(StatusCode::NO_CONTENT)
}

fn validate_query(query: &BookQuery) -> ApiResult<()> {
    if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
        if min > max {
            return Err(ApiError::Validation(
                "min_price must not exceed max_price".to_string(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (query.min_year, query.max_year) {
        if min > max {
            return Err(ApiError::Validation(
                "min_year must not exceed max_year".to_string(),
            ));
        }
    }
    if query.limit == 0 {
        return Err(ApiError::Validation("limit must be positive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Money;

    #[test]
    fn test_validate_query() {
        assert!(validate_query(&BookQuery::default()).is_ok());

        let inverted = BookQuery {
            min_price: Some(Money::from_units(10)),
            max_price: Some(Money::from_units(5)),
            ..Default::default()
        };
        assert!(validate_query(&inverted).is_err());

        let years = BookQuery {
            min_year: Some(2020),
            max_year: Some(1990),
            ..Default::default()
        };
        assert!(validate_query(&years).is_err());

        let zero = BookQuery {
            limit: 0,
            ..Default::default()
        };
        assert!(validate_query(&zero).is_err());
    }
}
