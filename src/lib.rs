//! # Bookstore
//!
//! Online bookstore backend - a full-stack Rust application serving a
//! catalog, carts, orders and an admin console over a JSON REST API.
//!
//! ## Features
//!
//! - **Catalog**: title search, dictionary filters, price/year ranges, sorting
//! - **Accounts**: argon2 password hashes, JWT bearer tokens, admin flag
//! - **Checkout**: carts turn into orders in a single SQLite transaction
//! - **Storefront hosting**: covers and the WASM UI bundle served alongside the API
//!
//! ## Modules
//!
//! - [`store`]: SQLite persistence for users, books, carts and orders
//! - [`auth`]: Password hashing and access tokens
//! - [`covers`]: Uploaded cover image storage
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookstore::store::{Money, NewBook, Store};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open_in_memory()?;
//!
//!     let book = store.create_book(NewBook {
//!         title: "The Left Hand of Darkness".to_string(),
//!         price: Money::from_units(450),
//!         genre_name: Some("Science Fiction".to_string()),
//!         author_names: vec!["Ursula K. Le Guin".to_string()],
//!         ..Default::default()
//!     })?;
//!
//!     println!("Created book #{} ({})", book.book_id, book.price);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod covers;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    Address, Author, Book, BookOrder, BookQuery, Cart, CartItem, Genre, Money, NewBook, Order,
    OrderStatus, Publisher, Store, StoreError, StoreResult, User,
};

pub use auth::{AuthError, TokenKeys};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::Config;
