//! Delivery addresses
//!
//! Invariants kept here rather than in handlers:
//! - a user's first address becomes the default;
//! - at most one address per user is the default;
//! - un-defaulting the default address is ignored (there must be one);
//! - deleting the default promotes the lowest-id remaining address.

use rusqlite::{params, OptionalExtension, Row, Transaction};

use super::types::{Address, AddressPatch, NewAddress};
use super::{Store, StoreError, StoreResult};

fn row_to_address(row: &Row<'_>) -> rusqlite::Result<Address> {
    Ok(Address {
        address_id: row.get(0)?,
        city: row.get(1)?,
        street: row.get(2)?,
        house: row.get(3)?,
        postal_code: row.get(4)?,
        is_default: row.get(5)?,
    })
}

fn fetch(tx: &Transaction<'_>, user_id: i64, address_id: i64) -> StoreResult<Option<Address>> {
    Ok(tx
        .query_row(
            "SELECT id, city, street, house, postal_code, is_default
             FROM addresses WHERE id = ?1 AND user_id = ?2",
            params![address_id, user_id],
            row_to_address,
        )
        .optional()?)
}

fn clear_default(tx: &Transaction<'_>, user_id: i64) -> StoreResult<()> {
    tx.execute(
        "UPDATE addresses SET is_default = 0 WHERE user_id = ?1",
        params![user_id],
    )?;
    Ok(())
}

impl Store {
    /// A user's addresses, default first, then by id
    pub fn list_addresses(&self, user_id: i64) -> StoreResult<Vec<Address>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, city, street, house, postal_code, is_default
                 FROM addresses WHERE user_id = ?1
                 ORDER BY is_default DESC, id ASC",
            )?;
            let rows = stmt
                .query_map(params![user_id], row_to_address)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create_address(&self, user_id: i64, new: NewAddress) -> StoreResult<Address> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let existing: i64 = tx.query_row(
                "SELECT COUNT(*) FROM addresses WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;
            let is_default = new.is_default || existing == 0;
            if is_default {
                clear_default(&tx, user_id)?;
            }

            tx.execute(
                "INSERT INTO addresses (user_id, city, street, house, postal_code, is_default)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user_id,
                    new.city.trim(),
                    new.street.trim(),
                    new.house.trim(),
                    new.postal_code.trim(),
                    is_default
                ],
            )?;
            let id = tx.last_insert_rowid();
            let address = fetch(&tx, user_id, id)?
                .ok_or_else(|| StoreError::NotFound("Address".to_string()))?;
            tx.commit()?;
            Ok(address)
        })
    }

    /// Apply a partial update to one of the user's addresses
    pub fn update_address(
        &self,
        user_id: i64,
        address_id: i64,
        patch: AddressPatch,
    ) -> StoreResult<Address> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut address = fetch(&tx, user_id, address_id)?
                .ok_or_else(|| StoreError::NotFound("Address".to_string()))?;

            if let Some(city) = patch.city {
                address.city = city.trim().to_string();
            }
            if let Some(street) = patch.street {
                address.street = street.trim().to_string();
            }
            if let Some(house) = patch.house {
                address.house = house.trim().to_string();
            }
            if let Some(postal_code) = patch.postal_code {
                address.postal_code = postal_code.trim().to_string();
            }
            // The default only moves by making another address default
            if patch.is_default == Some(true) && !address.is_default {
                clear_default(&tx, user_id)?;
                address.is_default = true;
            }

            tx.execute(
                "UPDATE addresses
                 SET city = ?1, street = ?2, house = ?3, postal_code = ?4, is_default = ?5
                 WHERE id = ?6",
                params![
                    address.city,
                    address.street,
                    address.house,
                    address.postal_code,
                    address.is_default,
                    address_id
                ],
            )?;
            tx.commit()?;
            Ok(address)
        })
    }

    pub fn delete_address(&self, user_id: i64, address_id: i64) -> StoreResult<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let address = fetch(&tx, user_id, address_id)?
                .ok_or_else(|| StoreError::NotFound("Address".to_string()))?;

            tx.execute("DELETE FROM addresses WHERE id = ?1", params![address_id])?;

            if address.is_default {
                tx.execute(
                    "UPDATE addresses SET is_default = 1
                     WHERE id = (SELECT MIN(id) FROM addresses WHERE user_id = ?1)",
                    params![user_id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::seed_user;

    fn address(city: &str, is_default: bool) -> NewAddress {
        NewAddress {
            city: city.to_string(),
            street: "Main street".to_string(),
            house: "1".to_string(),
            postal_code: "101000".to_string(),
            is_default,
        }
    }

    #[test]
    fn test_first_address_becomes_default() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");

        let first = store.create_address(user.user_id, address("Moscow", false)).unwrap();
        assert!(first.is_default);

        let second = store.create_address(user.user_id, address("Kazan", false)).unwrap();
        assert!(!second.is_default);
    }

    #[test]
    fn test_new_default_clears_previous() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");

        let first = store.create_address(user.user_id, address("Moscow", false)).unwrap();
        let second = store.create_address(user.user_id, address("Kazan", true)).unwrap();

        let list = store.list_addresses(user.user_id).unwrap();
        assert_eq!(list[0].address_id, second.address_id);
        assert!(list[0].is_default);
        assert_eq!(list[1].address_id, first.address_id);
        assert!(!list[1].is_default);
    }

    #[test]
    fn test_update_default_and_ignored_unset() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");

        let first = store.create_address(user.user_id, address("Moscow", false)).unwrap();
        let second = store.create_address(user.user_id, address("Kazan", false)).unwrap();

        let patch = AddressPatch {
            is_default: Some(true),
            city: Some(" Sochi ".to_string()),
            ..Default::default()
        };
        let updated = store
            .update_address(user.user_id, second.address_id, patch)
            .unwrap();
        assert!(updated.is_default);
        assert_eq!(updated.city, "Sochi");

        // Un-defaulting the current default keeps it default
        let patch = AddressPatch {
            is_default: Some(false),
            ..Default::default()
        };
        let unchanged = store
            .update_address(user.user_id, second.address_id, patch)
            .unwrap();
        assert!(unchanged.is_default);

        let list = store.list_addresses(user.user_id).unwrap();
        let defaults = list.iter().filter(|a| a.is_default).count();
        assert_eq!(defaults, 1);
        assert!(!list.iter().any(|a| a.address_id == first.address_id && a.is_default));
    }

    #[test]
    fn test_delete_default_promotes_first_remaining() {
        let store = Store::open_in_memory().unwrap();
        let user = seed_user(&store, "a@example.com");

        let first = store.create_address(user.user_id, address("Moscow", false)).unwrap();
        let second = store.create_address(user.user_id, address("Kazan", false)).unwrap();
        let third = store.create_address(user.user_id, address("Omsk", false)).unwrap();

        store.delete_address(user.user_id, first.address_id).unwrap();

        let list = store.list_addresses(user.user_id).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].address_id, second.address_id);
        assert!(list[0].is_default);
        assert_eq!(list[1].address_id, third.address_id);
    }

    #[test]
    fn test_foreign_address_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let owner = seed_user(&store, "owner@example.com");
        let other = seed_user(&store, "other@example.com");

        let addr = store.create_address(owner.user_id, address("Moscow", false)).unwrap();

        assert!(matches!(
            store.delete_address(other.user_id, addr.address_id),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update_address(other.user_id, addr.address_id, AddressPatch::default()),
            Err(StoreError::NotFound(_))
        ));
    }
}
