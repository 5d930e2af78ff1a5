//! Dictionary Routes
//!
//! Public lookup lists used by catalog filters and admin suggestions.
//!
//! - GET /api/dicts/genres
//! - GET /api/dicts/authors
//! - GET /api/dicts/publishers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::store::{Author, Genre, Publisher};

/// GET /api/dicts/genres
pub async fn list_genres(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Genre>>> {
    Ok(Json(state.store.list_genres()?))
}

/// GET /api/dicts/authors
pub async fn list_authors(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Author>>> {
    Ok(Json(state.store.list_authors()?))
}

/// GET /api/dicts/publishers
pub async fn list_publishers(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Publisher>>> {
    Ok(Json(state.store.list_publishers()?))
}
