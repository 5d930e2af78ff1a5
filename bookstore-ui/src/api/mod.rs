//! API Module
//!
//! HTTP client for the bookstore REST API.

pub mod client;
pub mod types;

pub use client::*;
pub use types::*;
