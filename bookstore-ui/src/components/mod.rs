//! UI Components
//!
//! Reusable Leptos components for the storefront.

pub mod book_card;
pub mod form;
pub mod loading;
pub mod nav;
pub mod pagination;
pub mod toast;

pub use book_card::{BookCard, Cover};
pub use form::{FormField, FormState, FormSummary};
pub use loading::{BookCardSkeletons, ListSkeleton, Loading};
pub use nav::Nav;
pub use pagination::Pager;
pub use toast::Toast;
