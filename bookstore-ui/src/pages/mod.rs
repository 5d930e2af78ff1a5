//! Pages
//!
//! Top-level page components for each route.

pub mod admin;
pub mod book_detail;
pub mod cart;
pub mod catalog;
pub mod login;
pub mod orders;
pub mod profile;
pub mod register;

pub use admin::Admin;
pub use book_detail::BookDetail;
pub use cart::CartPage;
pub use catalog::Catalog;
pub use login::Login;
pub use orders::Orders;
pub use profile::ProfilePage;
pub use register::Register;
