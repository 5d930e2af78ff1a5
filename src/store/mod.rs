//! Bookstore Store
//!
//! SQLite persistence for the bookstore domain:
//!
//! - **types**: Rows handed out by the store (Book, Cart, Order, ...)
//! - **schema**: Table definitions applied on open
//! - **users** / **addresses**: Accounts and delivery addresses
//! - **dictionaries**: Genres, authors, publishers
//! - **books**: Catalog listing, filtering, CRUD
//! - **carts** / **orders**: Purchase flow
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Handler → Store (Arc<Mutex<Connection>>) → SQLite file (WAL)
//! ```
//!
//! A single connection is shared behind a mutex; every operation holds the
//! lock for the duration of one short statement or transaction.
//!
//! # Example
//!
//! ```rust,no_run
//! use bookstore::store::{BookQuery, NewBook, Money, Store};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open("./bookstore.db")?;
//!
//!     let book = store.create_book(NewBook {
//!         title: "Dune".into(),
//!         price: Money::from_units(900),
//!         author_names: vec!["Frank Herbert".into()],
//!         ..Default::default()
//!     })?;
//!
//!     let page = store.list_books(&BookQuery::default())?;
//!     assert!(page.iter().any(|b| b.book_id == book.book_id));
//!     Ok(())
//! }
//! ```

pub mod addresses;
pub mod books;
pub mod carts;
pub mod dictionaries;
pub mod error;
pub mod orders;
pub mod schema;
pub mod types;
pub mod users;

pub use error::{StoreError, StoreResult};
pub use types::{
    Address, AddressPatch, Author, Book, BookOrder, BookPatch, BookQuery, Cart, CartBook,
    CartItem, DictKind, Genre, Money, NewAddress, NewBook, NewUser, Order, OrderItem,
    OrderStatus, Publisher, User,
};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Handle to the bookstore database
///
/// Cheap to clone; all clones share one connection. Uses a std Mutex
/// because `rusqlite::Connection` is `!Sync`.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) a database file and apply the schema
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database (tests, one-off tools)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::apply(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with exclusive access to the connection
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        f(&mut conn)
    }

    /// Cheap round trip used by readiness probes
    pub fn ping(&self) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }
}

/// Current time as stored in `created_at` columns
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH)
}

/// Trim a user-supplied optional string, mapping blank to `None`
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("bookstore.db");

        let store = Store::open(&path).unwrap();
        store.ping().unwrap();
        assert!(path.exists());

        // Reopening applies the schema idempotently
        drop(store);
        let store = Store::open(&path).unwrap();
        store.ping().unwrap();
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  x ".into())), Some("x".into()));
        assert_eq!(clean_optional(Some("   ".into())), None);
        assert_eq!(clean_optional(None), None);
    }
}
