//! Response and request shapes of the bookstore API.
//!
//! Prices arrive as JSON numbers with two decimals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub is_admin: bool,
}

/// Account row in the admin console
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AdminUser {
    #[serde(flatten)]
    pub user: User,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Address {
    pub address_id: i64,
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
    pub is_default: bool,
}

impl Address {
    pub fn one_line(&self) -> String {
        format!(
            "{}, {} {}, {}",
            self.city, self.street, self.house, self.postal_code
        )
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NewAddress {
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
    pub is_default: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Genre {
    pub genre_id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Author {
    pub author_id: i64,
    pub full_name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Publisher {
    pub publisher_id: i64,
    pub name: String,
}

/// Dictionary entry with the kind-specific keys folded away
#[derive(Clone, Debug, PartialEq)]
pub struct DictEntry {
    pub id: i64,
    pub name: String,
}

impl From<Genre> for DictEntry {
    fn from(genre: Genre) -> Self {
        Self {
            id: genre.genre_id,
            name: genre.name,
        }
    }
}

impl From<Author> for DictEntry {
    fn from(author: Author) -> Self {
        Self {
            id: author.author_id,
            name: author.full_name,
        }
    }
}

impl From<Publisher> for DictEntry {
    fn from(publisher: Publisher) -> Self {
        Self {
            id: publisher.publisher_id,
            name: publisher.name,
        }
    }
}

/// Admin-managed dictionaries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DictKind {
    Genres,
    Authors,
    Publishers,
}

impl DictKind {
    pub fn path(self) -> &'static str {
        match self {
            DictKind::Genres => "genres",
            DictKind::Authors => "authors",
            DictKind::Publishers => "publishers",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DictKind::Genres => "Genres",
            DictKind::Authors => "Authors",
            DictKind::Publishers => "Publishers",
        }
    }

    /// Body key carrying the entry name
    pub fn name_key(self) -> &'static str {
        match self {
            DictKind::Authors => "full_name",
            _ => "name",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Book {
    pub book_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub pages: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub genre_name: Option<String>,
    #[serde(default)]
    pub publisher_name: Option<String>,
    #[serde(default)]
    pub author_names: Vec<String>,
}

impl Book {
    /// Comma-separated authors, or "Not specified"
    pub fn authors_label(&self) -> String {
        if self.author_names.is_empty() {
            "Not specified".to_string()
        } else {
            self.author_names.join(", ")
        }
    }
}

/// Create/edit payload; dictionaries are referenced by name
///
/// Every key is always sent: an emptied input goes out as `null`, which
/// clears the field on update.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BookForm {
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub isbn: Option<String>,
    pub genre_name: Option<String>,
    pub publisher_name: Option<String>,
    pub author_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CartBook {
    pub book_id: i64,
    pub title: String,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CartItem {
    pub cart_item_id: i64,
    pub book_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub book: Option<CartBook>,
}

impl CartItem {
    pub fn title(&self) -> String {
        self.book
            .as_ref()
            .map(|b| b.title.clone())
            .unwrap_or_else(|| format!("#{}", self.book_id))
    }

    pub fn unit_price(&self) -> f64 {
        self.book.as_ref().map(|b| b.price).unwrap_or(0.0)
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price() * self.quantity as f64
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Cart {
    pub cart_id: i64,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OrderItem {
    pub order_item_id: i64,
    pub book_id: i64,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub total_amount: f64,
    pub status: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Order lifecycle values accepted by the admin status endpoint
pub const ORDER_STATUSES: [&str; 4] = ["created", "paid", "shipped", "done"];

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Prices are shown with two decimals
pub fn format_price(amount: f64) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_totals_with_missing_book() {
        let cart: Cart = serde_json::from_str(
            r#"{"cart_id": 1, "items": [
                {"cart_item_id": 1, "book_id": 4, "quantity": 2,
                 "book": {"book_id": 4, "title": "Dune", "price": 450.5}},
                {"cart_item_id": 2, "book_id": 9, "quantity": 1, "book": null}
            ]}"#,
        )
        .unwrap();

        assert_eq!(cart.items[0].line_total(), 901.0);
        assert_eq!(cart.items[1].title(), "#9");
        assert_eq!(format_price(cart.total()), "901.00");
    }

    #[test]
    fn test_book_authors_label() {
        let book: Book = serde_json::from_str(
            r#"{"book_id": 1, "title": "Anonymous", "price": 10.0, "author_names": []}"#,
        )
        .unwrap();
        assert_eq!(book.authors_label(), "Not specified");
    }

    #[test]
    fn test_profile_flattens_user() {
        let profile: Profile = serde_json::from_str(
            r#"{"user_id": 2, "email": "a@b.co", "full_name": "Ann", "phone": null,
                "is_admin": false, "addresses": []}"#,
        )
        .unwrap();
        assert_eq!(profile.user.full_name, "Ann");
        assert!(profile.addresses.is_empty());
    }
}
