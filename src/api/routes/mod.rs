//! API Routes
//!
//! Route handlers organized by functionality.

pub mod admin;
pub mod auth;
pub mod books;
pub mod cart;
pub mod dicts;
pub mod health;
pub mod orders;
pub mod users;
