//! Bookstore Storefront
//!
//! Online bookstore client built with Leptos (WASM).
//!
//! # Features
//!
//! - Catalog with debounced filters, quick presets and pagination
//! - Book pages, cart and checkout
//! - Account profile with delivery addresses
//! - Admin console for books, dictionaries, orders and users
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It talks to the bookstore REST API under `/api` and is
//! served by the same process.

use leptos::*;

mod api;
mod app;
mod catalog;
mod components;
mod debounce;
mod pages;
mod state;
mod validation;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
