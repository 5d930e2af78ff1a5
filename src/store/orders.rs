//! Orders
//!
//! Checkout turns the user's cart into an order in one transaction:
//! line prices are captured from the current book prices, the total is
//! their sum, and the cart is emptied.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::carts::{cart_id_for, load_cart};
use super::types::{Money, Order, OrderItem, OrderStatus};
use super::{millis_to_datetime, now_millis, Store, StoreError, StoreResult};

/// Raw order row before items are attached
fn row_to_order(row: &Row<'_>) -> rusqlite::Result<(Order, String)> {
    let status: String = row.get(4)?;
    Ok((
        Order {
            order_id: row.get(0)?,
            user_id: row.get(1)?,
            created_at: millis_to_datetime(row.get(2)?),
            total_amount: Money::from_cents(row.get(3)?),
            status: OrderStatus::Created,
            items: Vec::new(),
        },
        status,
    ))
}

fn finish_order(conn: &Connection, (mut order, status): (Order, String)) -> StoreResult<Order> {
    order.status = status.parse().map_err(StoreError::Invalid)?;

    let mut stmt = conn.prepare_cached(
        "SELECT id, book_id, quantity, price_cents FROM order_items
         WHERE order_id = ?1 ORDER BY id",
    )?;
    order.items = stmt
        .query_map(params![order.order_id], |row| {
            Ok(OrderItem {
                order_item_id: row.get(0)?,
                book_id: row.get(1)?,
                quantity: row.get(2)?,
                price: Money::from_cents(row.get(3)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(order)
}

fn query_orders(conn: &Connection, filter: &str, user_id: Option<i64>) -> StoreResult<Vec<Order>> {
    let sql = format!(
        "SELECT id, user_id, created_at, total_cents, status FROM orders {}
         ORDER BY created_at DESC, id DESC",
        filter
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = match user_id {
        Some(user_id) => stmt
            .query_map(params![user_id], row_to_order)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt
            .query_map([], row_to_order)?
            .collect::<Result<Vec<_>, _>>()?,
    };
    rows.into_iter().map(|row| finish_order(conn, row)).collect()
}

fn load_order(conn: &Connection, order_id: i64) -> StoreResult<Option<Order>> {
    let row = conn
        .query_row(
            "SELECT id, user_id, created_at, total_cents, status FROM orders WHERE id = ?1",
            params![order_id],
            row_to_order,
        )
        .optional()?;
    row.map(|row| finish_order(conn, row)).transpose()
}

impl Store {
    /// Convert the user's cart into an order; `None` when the cart is empty
    pub fn create_order_from_cart(&self, user_id: i64) -> StoreResult<Option<Order>> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let cart_id = cart_id_for(&tx, user_id)?;
            let cart = load_cart(&tx, cart_id)?;

            // Lines whose book has vanished cannot be priced
            let lines: Vec<_> = cart
                .items
                .iter()
                .filter_map(|item| item.book.as_ref().map(|b| (item.book_id, item.quantity, b.price)))
                .collect();
            if lines.is_empty() {
                return Ok(None);
            }

            let total: Money = lines.iter().map(|(_, qty, price)| price.times(*qty)).sum();
            tx.execute(
                "INSERT INTO orders (user_id, created_at, total_cents, status)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, now_millis(), total.cents(), OrderStatus::Created.as_str()],
            )?;
            let order_id = tx.last_insert_rowid();

            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO order_items (order_id, book_id, quantity, price_cents)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for (book_id, quantity, price) in &lines {
                    stmt.execute(params![order_id, book_id, quantity, price.cents()])?;
                }
            }

            tx.execute("DELETE FROM cart_items WHERE cart_id = ?1", params![cart_id])?;

            let order = load_order(&tx, order_id)?
                .ok_or_else(|| StoreError::NotFound("Order".to_string()))?;
            tx.commit()?;

            tracing::info!(order_id, user_id, total = %total, "Order placed");
            Ok(Some(order))
        })
    }

    /// A user's orders, newest first
    pub fn list_orders_for_user(&self, user_id: i64) -> StoreResult<Vec<Order>> {
        self.with_conn(|conn| query_orders(conn, "WHERE user_id = ?1", Some(user_id)))
    }

    /// Every order, newest first
    pub fn list_all_orders(&self) -> StoreResult<Vec<Order>> {
        self.with_conn(|conn| query_orders(conn, "", None))
    }

    pub fn get_order(&self, order_id: i64) -> StoreResult<Option<Order>> {
        self.with_conn(|conn| load_order(conn, order_id))
    }

    pub fn update_order_status(&self, order_id: i64, status: OrderStatus) -> StoreResult<Order> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE orders SET status = ?1 WHERE id = ?2",
                params![status.as_str(), order_id],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound("Order".to_string()));
            }
            load_order(conn, order_id)?.ok_or_else(|| StoreError::NotFound("Order".to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{seed_book, seed_user};
    use crate::store::types::BookPatch;

    #[test]
    fn test_empty_cart_yields_no_order() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");

        assert!(store.create_order_from_cart(user.user_id).unwrap().is_none());
        assert!(store.list_orders_for_user(user.user_id).unwrap().is_empty());
    }

    #[test]
    fn test_checkout_snapshots_prices_and_clears_cart() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");
        let a = seed_book(&store, "A", 1050);
        let b = seed_book(&store, "B", 300);

        store.add_cart_item(user.user_id, a.book_id, 2).unwrap();
        store.add_cart_item(user.user_id, b.book_id, 1).unwrap();

        let order = store.create_order_from_cart(user.user_id).unwrap().unwrap();
        assert_eq!(order.total_amount, Money::from_cents(2400));
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price, Money::from_cents(1050));
        assert!(store.get_or_create_cart(user.user_id).unwrap().items.is_empty());

        // Later price changes do not touch the order
        store
            .update_book(
                a.book_id,
                BookPatch {
                    price: Some(Money::from_cents(9999)),
                    ..Default::default()
                },
            )
            .unwrap();
        let stored = store.get_order(order.order_id).unwrap().unwrap();
        assert_eq!(stored.items[0].price, Money::from_cents(1050));

        // Deleting a book keeps the order history
        store.delete_book(b.book_id).unwrap();
        let stored = store.get_order(order.order_id).unwrap().unwrap();
        assert_eq!(stored.items.len(), 2);
    }

    #[test]
    fn test_listing_is_newest_first_and_scoped() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");
        let other = seed_user(&store, "b@example.com");
        let book = seed_book(&store, "A", 100);

        store.add_cart_item(user.user_id, book.book_id, 1).unwrap();
        let first = store.create_order_from_cart(user.user_id).unwrap().unwrap();
        store.add_cart_item(user.user_id, book.book_id, 1).unwrap();
        let second = store.create_order_from_cart(user.user_id).unwrap().unwrap();
        store.add_cart_item(other.user_id, book.book_id, 1).unwrap();
        store.create_order_from_cart(other.user_id).unwrap().unwrap();

        let mine = store.list_orders_for_user(user.user_id).unwrap();
        let ids: Vec<_> = mine.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![second.order_id, first.order_id]);

        assert_eq!(store.list_all_orders().unwrap().len(), 3);
    }

    #[test]
    fn test_update_status() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");
        let book = seed_book(&store, "A", 100);
        store.add_cart_item(user.user_id, book.book_id, 1).unwrap();
        let order = store.create_order_from_cart(user.user_id).unwrap().unwrap();

        let shipped = store
            .update_order_status(order.order_id, OrderStatus::Shipped)
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
        assert!(matches!(
            store.update_order_status(999, OrderStatus::Paid),
            Err(StoreError::NotFound(_))
        ));
    }
}
