//! Shopping carts
//!
//! One cart per user, created on first access. Adding a book that is
//! already in the cart increases the existing line's quantity.

use rusqlite::{params, Connection, OptionalExtension};

use super::types::{Cart, CartBook, CartItem, Money};
use super::{Store, StoreError, StoreResult};

pub(crate) fn cart_id_for(conn: &Connection, user_id: i64) -> StoreResult<i64> {
    let existing = conn
        .query_row(
            "SELECT id FROM carts WHERE user_id = ?1",
            params![user_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    match existing {
        Some(id) => Ok(id),
        None => {
            conn.execute("INSERT INTO carts (user_id) VALUES (?1)", params![user_id])?;
            tracing::debug!(user_id, "Created cart");
            Ok(conn.last_insert_rowid())
        }
    }
}

pub(crate) fn load_cart(conn: &Connection, cart_id: i64) -> StoreResult<Cart> {
    let mut stmt = conn.prepare_cached(
        "SELECT ci.id, ci.book_id, ci.quantity, b.title, b.price_cents
         FROM cart_items ci
         LEFT JOIN books b ON b.id = ci.book_id
         WHERE ci.cart_id = ?1
         ORDER BY ci.id",
    )?;
    let items = stmt
        .query_map(params![cart_id], |row| {
            let book_id: i64 = row.get(1)?;
            let title: Option<String> = row.get(3)?;
            let price: Option<i64> = row.get(4)?;
            Ok(CartItem {
                cart_item_id: row.get(0)?,
                book_id,
                quantity: row.get(2)?,
                book: title.zip(price).map(|(title, cents)| CartBook {
                    book_id,
                    title,
                    price: Money::from_cents(cents),
                }),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Cart { cart_id, items })
}

fn validate_quantity(quantity: i64) -> StoreResult<()> {
    if quantity < 1 {
        return Err(StoreError::Invalid("Quantity must be at least 1".to_string()));
    }
    Ok(())
}

/// Find a line by id, but only within the given cart
fn owned_item(conn: &Connection, cart_id: i64, cart_item_id: i64) -> StoreResult<()> {
    conn.query_row(
        "SELECT 1 FROM cart_items WHERE id = ?1 AND cart_id = ?2",
        params![cart_item_id, cart_id],
        |_| Ok(()),
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound("Cart item".to_string()))
}

impl Store {
    pub fn get_or_create_cart(&self, user_id: i64) -> StoreResult<Cart> {
        self.with_conn(|conn| {
            let cart_id = cart_id_for(conn, user_id)?;
            load_cart(conn, cart_id)
        })
    }

    pub fn add_cart_item(&self, user_id: i64, book_id: i64, quantity: i64) -> StoreResult<Cart> {
        validate_quantity(quantity)?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let book_exists = tx
                .query_row("SELECT 1 FROM books WHERE id = ?1", params![book_id], |_| Ok(()))
                .optional()?
                .is_some();
            if !book_exists {
                return Err(StoreError::NotFound("Book".to_string()));
            }

            let cart_id = cart_id_for(&tx, user_id)?;
            tx.execute(
                "INSERT INTO cart_items (cart_id, book_id, quantity) VALUES (?1, ?2, ?3)
                 ON CONFLICT (cart_id, book_id) DO UPDATE SET quantity = quantity + excluded.quantity",
                params![cart_id, book_id, quantity],
            )?;
            let cart = load_cart(&tx, cart_id)?;
            tx.commit()?;
            Ok(cart)
        })
    }

    pub fn update_cart_item(
        &self,
        user_id: i64,
        cart_item_id: i64,
        quantity: i64,
    ) -> StoreResult<Cart> {
        validate_quantity(quantity)?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let cart_id = cart_id_for(&tx, user_id)?;
            owned_item(&tx, cart_id, cart_item_id)?;
            tx.execute(
                "UPDATE cart_items SET quantity = ?1 WHERE id = ?2",
                params![quantity, cart_item_id],
            )?;
            let cart = load_cart(&tx, cart_id)?;
            tx.commit()?;
            Ok(cart)
        })
    }

    pub fn remove_cart_item(&self, user_id: i64, cart_item_id: i64) -> StoreResult<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let cart_id = cart_id_for(&tx, user_id)?;
            owned_item(&tx, cart_id, cart_item_id)?;
            tx.execute("DELETE FROM cart_items WHERE id = ?1", params![cart_item_id])?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn clear_cart(&self, user_id: i64) -> StoreResult<()> {
        self.with_conn(|conn| {
            let cart_id = cart_id_for(conn, user_id)?;
            conn.execute("DELETE FROM cart_items WHERE cart_id = ?1", params![cart_id])?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{seed_book, seed_user};

    #[test]
    fn test_cart_is_created_lazily_and_reused() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");

        let first = store.get_or_create_cart(user.user_id).unwrap();
        let second = store.get_or_create_cart(user.user_id).unwrap();
        assert_eq!(first.cart_id, second.cart_id);
        assert!(first.items.is_empty());
    }

    #[test]
    fn test_adding_same_book_merges_quantity() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");
        let book = seed_book(&store, "Merge", 250);

        store.add_cart_item(user.user_id, book.book_id, 1).unwrap();
        let cart = store.add_cart_item(user.user_id, book.book_id, 2).unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        let embedded = cart.items[0].book.as_ref().unwrap();
        assert_eq!(embedded.title, "Merge");
        assert_eq!(cart.total(), Money::from_cents(750));
    }

    #[test]
    fn test_add_rejects_unknown_book_and_bad_quantity() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");
        let book = seed_book(&store, "Real", 100);

        assert!(matches!(
            store.add_cart_item(user.user_id, 999, 1),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.add_cart_item(user.user_id, book.book_id, 0),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn test_update_and_remove_only_own_items() {
        let store = Store::open_in_memory().unwrap();
        let owner = seed_user(&store, "owner@example.com");
        let other = seed_user(&store, "other@example.com");
        let book = seed_book(&store, "Mine", 100);

        let cart = store.add_cart_item(owner.user_id, book.book_id, 1).unwrap();
        let item_id = cart.items[0].cart_item_id;

        assert!(matches!(
            store.update_cart_item(other.user_id, item_id, 5),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.remove_cart_item(other.user_id, item_id),
            Err(StoreError::NotFound(_))
        ));

        let cart = store.update_cart_item(owner.user_id, item_id, 4).unwrap();
        assert_eq!(cart.items[0].quantity, 4);

        store.remove_cart_item(owner.user_id, item_id).unwrap();
        assert!(store.get_or_create_cart(owner.user_id).unwrap().items.is_empty());
    }

    #[test]
    fn test_clear_cart() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");
        let a = seed_book(&store, "A", 100);
        let b = seed_book(&store, "B", 200);

        store.add_cart_item(user.user_id, a.book_id, 1).unwrap();
        store.add_cart_item(user.user_id, b.book_id, 1).unwrap();
        store.clear_cart(user.user_id).unwrap();

        assert!(store.get_or_create_cart(user.user_id).unwrap().items.is_empty());
    }
}
