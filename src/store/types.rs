//! Core data types for the bookstore store
//!
//! These are the rows the store hands out, shaped the way the REST API
//! serializes them:
//! - `Money`: exact amount in minor units
//! - `User`, `Address`: accounts and delivery addresses
//! - `Genre`, `Author`, `Publisher`: catalog dictionaries
//! - `Book`, `BookQuery`: catalog entries and listing filters
//! - `Cart`, `Order`: the purchase flow

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================
// MONEY
// ============================================

/// Monetary amount stored as integer minor units (cents/kopecks)
///
/// Serialized as a JSON number with two decimals; accepted as a number
/// or a numeric string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiply by a quantity, saturating instead of overflowing
    pub fn times(self, quantity: i64) -> Self {
        Money(self.0.saturating_mul(quantity))
    }

    fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match digits.split_once(['.', ',']) {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(format!("invalid amount '{}'", s));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
            || frac.len() > 2
        {
            return Err(format!("invalid amount '{}'", s));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| format!("amount '{}' is too large", s))?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse().unwrap_or(0),
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| format!("amount '{}' is too large", s))?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl<'de> de::Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a monetary amount as a number or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                v.checked_mul(100)
                    .map(Money)
                    .ok_or_else(|| E::custom("amount is too large"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map_err(|_| E::custom("amount is too large"))
                    .and_then(|v| self.visit_i64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                if !v.is_finite() || v.abs() > (i64::MAX / 100) as f64 {
                    return Err(E::custom("amount is out of range"));
                }
                Ok(Money((v * 100.0).round() as i64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// ============================================
// USERS
// ============================================

/// A registered account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an account (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Delivery address owned by a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub address_id: i64,
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
    pub is_default: bool,
}

/// Input for creating an address
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub city: String,
    pub street: String,
    pub house: String,
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial address update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub postal_code: Option<String>,
    pub is_default: Option<bool>,
}

// ============================================
// DICTIONARIES
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Genre {
    pub genre_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub author_id: i64,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Publisher {
    pub publisher_id: i64,
    pub name: String,
}

/// The three lookup tables books reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictKind {
    Genre,
    Author,
    Publisher,
}

impl DictKind {
    /// Human label used in error messages
    pub fn label(self) -> &'static str {
        match self {
            DictKind::Genre => "Genre",
            DictKind::Author => "Author",
            DictKind::Publisher => "Publisher",
        }
    }
}

// ============================================
// BOOKS
// ============================================

/// A catalog entry with its dictionary names resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    pub book_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub genre_id: Option<i64>,
    pub publisher_id: Option<i64>,
    pub author_ids: Vec<i64>,
    pub author_names: Vec<String>,
    pub genre_name: Option<String>,
    pub publisher_name: Option<String>,
}

/// Input for creating a book
///
/// Dictionary references may be given by id or by name; names are
/// resolved (and created when missing) by their trimmed value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub pages: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub genre_id: Option<i64>,
    #[serde(default)]
    pub publisher_id: Option<i64>,
    #[serde(default)]
    pub author_ids: Vec<i64>,
    #[serde(default)]
    pub genre_name: Option<String>,
    #[serde(default)]
    pub publisher_name: Option<String>,
    #[serde(default)]
    pub author_names: Vec<String>,
}

/// Partial book update; absent fields are left unchanged
///
/// Nullable columns take `Option<Option<T>>`: an absent key is `None`,
/// an explicit `null` is `Some(None)` and clears the value. When either
/// `author_ids` or `author_names` is present the author set is replaced
/// by their union.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub price: Option<Money>,
    #[serde(default, deserialize_with = "nullable")]
    pub publication_year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub pages: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub isbn: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub genre_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub publisher_id: Option<Option<i64>>,
    pub author_ids: Option<Vec<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub genre_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub publisher_name: Option<Option<String>>,
    pub author_names: Option<Vec<String>>,
}

/// A present key, `null` included, becomes `Some`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Sort order for catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookOrder {
    PriceAsc,
    PriceDesc,
    YearAsc,
    YearDesc,
    TitleAsc,
    TitleDesc,
    Newest,
}

impl BookOrder {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            BookOrder::PriceAsc => "b.price_cents ASC, b.id ASC",
            BookOrder::PriceDesc => "b.price_cents DESC, b.id ASC",
            BookOrder::YearAsc => "b.publication_year IS NULL, b.publication_year ASC, b.id ASC",
            BookOrder::YearDesc => "b.publication_year IS NULL, b.publication_year DESC, b.id ASC",
            BookOrder::TitleAsc => "b.title_folded ASC, b.id ASC",
            BookOrder::TitleDesc => "b.title_folded DESC, b.id ASC",
            BookOrder::Newest => "b.id DESC",
        }
    }
}

pub const DEFAULT_BOOK_LIMIT: u32 = 100;
pub const MAX_BOOK_LIMIT: u32 = 100;

fn default_book_limit() -> u32 {
    DEFAULT_BOOK_LIMIT
}

/// Catalog listing filters
#[derive(Debug, Clone, Deserialize)]
pub struct BookQuery {
    /// Case-insensitive title substring
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub genre_id: Option<i64>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub publisher_id: Option<i64>,
    #[serde(default)]
    pub min_price: Option<Money>,
    #[serde(default)]
    pub max_price: Option<Money>,
    #[serde(default)]
    pub min_year: Option<i32>,
    #[serde(default)]
    pub max_year: Option<i32>,
    #[serde(default)]
    pub order_by: Option<BookOrder>,
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_book_limit")]
    pub limit: u32,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            q: None,
            genre_id: None,
            author_id: None,
            publisher_id: None,
            min_price: None,
            max_price: None,
            min_year: None,
            max_year: None,
            order_by: None,
            skip: 0,
            limit: DEFAULT_BOOK_LIMIT,
        }
    }
}

// ============================================
// CART
// ============================================

/// Book summary embedded in cart lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartBook {
    pub book_id: i64,
    pub title: String,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub cart_item_id: i64,
    pub book_id: i64,
    pub quantity: i64,
    pub book: Option<CartBook>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cart {
    pub cart_id: i64,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Sum of unit price times quantity over all lines
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .filter_map(|item| item.book.as_ref().map(|b| b.price.times(item.quantity)))
            .sum()
    }
}

// ============================================
// ORDERS
// ============================================

/// Order lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Shipped,
    Done,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Created,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Done => "done",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid status '{}'. Valid: created, paid, shipped, done",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub order_item_id: i64,
    pub book_id: i64,
    pub quantity: i64,
    /// Unit price captured at checkout
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_parse() {
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_cents(1250));
        assert_eq!("12,05".parse::<Money>().unwrap(), Money::from_cents(1205));
        assert_eq!("500".parse::<Money>().unwrap(), Money::from_units(500));
        assert_eq!("-3.10".parse::<Money>().unwrap(), Money::from_cents(-310));
        assert!("1.234".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(123456).to_string(), "1234.56");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
    }

    #[test]
    fn test_money_json() {
        let json = serde_json::to_string(&Money::from_cents(1999)).unwrap();
        assert_eq!(json, "19.99");

        let from_number: Money = serde_json::from_str("19.99").unwrap();
        let from_int: Money = serde_json::from_str("20").unwrap();
        let from_string: Money = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(from_number, Money::from_cents(1999));
        assert_eq!(from_int, Money::from_cents(2000));
        assert_eq!(from_string, Money::from_cents(1999));
    }

    #[test]
    fn test_cart_total() {
        let cart = Cart {
            cart_id: 1,
            items: vec![
                CartItem {
                    cart_item_id: 1,
                    book_id: 1,
                    quantity: 2,
                    book: Some(CartBook {
                        book_id: 1,
                        title: "A".into(),
                        price: Money::from_cents(1050),
                    }),
                },
                CartItem {
                    cart_item_id: 2,
                    book_id: 2,
                    quantity: 1,
                    book: Some(CartBook {
                        book_id: 2,
                        title: "B".into(),
                        price: Money::from_cents(300),
                    }),
                },
            ],
        };
        assert_eq!(cart.total(), Money::from_cents(2400));
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!("paid".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert_eq!(" Shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_book_query_defaults() {
        let query: BookQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, DEFAULT_BOOK_LIMIT);
        assert!(query.order_by.is_none());
    }
}
