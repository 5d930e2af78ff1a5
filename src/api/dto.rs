//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.
//!
//! Catalog, cart and order rows are serialized straight from
//! `crate::store` types; only shapes that differ live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Address, User};

// ============================================
// AUTH DTOs
// ============================================

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email (unique)
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Optional contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Plain password, hashed before storage
    pub password: String,
}

/// JSON login body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2 password-flow login form (`username` carries the email)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Issued access token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
}

// ============================================
// USER DTOs
// ============================================

/// Public view of an account
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_admin: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Account as listed in the admin console
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl From<&User> for AdminUserResponse {
    fn from(user: &User) -> Self {
        Self {
            user: UserResponse::from(user),
            created_at: user.created_at,
        }
    }
}

/// Own profile with delivery addresses
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Addresses, default first
    pub addresses: Vec<Address>,
}

/// Profile update
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub email: String,
    /// At least 2 characters
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Password change
#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

// ============================================
// CART DTOs
// ============================================

fn default_quantity() -> i64 {
    1
}

/// Add-to-cart request
#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub book_id: i64,
    /// Defaults to 1
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// Cart line quantity change
#[derive(Debug, Deserialize)]
pub struct CartItemUpdateRequest {
    pub quantity: i64,
}

// ============================================
// ADMIN DTOs
// ============================================

/// Dictionary create/rename body
///
/// Genres and publishers send `name`; authors send `full_name`.
#[derive(Debug, Deserialize)]
pub struct DictEntryRequest {
    #[serde(alias = "full_name")]
    pub name: String,
}

/// Admin flag toggle
#[derive(Debug, Deserialize)]
pub struct AdminFlagRequest {
    pub is_admin: bool,
}

/// Order status change
#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    /// One of created, paid, shipped, done
    pub status: String,
}

/// Base64 cover upload
#[derive(Debug, Deserialize)]
pub struct CoverUploadRequest {
    /// Original file name; only its extension is kept
    #[serde(default)]
    pub filename: String,
    /// Base64 payload or data URL
    pub content: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "healthy" or "unhealthy"
    pub status: String,
    /// Database status: "ok" or "error"
    pub database: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Version string
    pub version: String,
}
