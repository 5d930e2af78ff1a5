//! Account persistence

use rusqlite::{params, OptionalExtension, Row};

use super::{millis_to_datetime, now_millis, Store, StoreError, StoreResult};
use super::types::{NewUser, User};

const USER_COLUMNS: &str = "id, email, full_name, phone, password_hash, is_admin, created_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        phone: row.get(3)?,
        password_hash: row.get(4)?,
        is_admin: row.get(5)?,
        created_at: millis_to_datetime(row.get(6)?),
    })
}

/// Emails compare case-insensitively; they are stored trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Store {
    /// Insert a new account; duplicate email is a `Conflict`
    pub fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let email = normalize_email(&new.email);
        let user_id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (email, full_name, phone, password_hash, is_admin, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    email,
                    new.full_name.trim(),
                    super::clean_optional(new.phone),
                    new.password_hash,
                    new.is_admin,
                    now_millis()
                ],
            )
            .map_err(|e| StoreError::on_unique(e, "User with this email already exists"))?;
            Ok(conn.last_insert_rowid())
        })?;

        self.get_user(user_id)?
            .ok_or_else(|| StoreError::NotFound("User".to_string()))
    }

    pub fn get_user(&self, user_id: i64) -> StoreResult<Option<User>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
            Ok(conn
                .query_row(&sql, params![user_id], row_to_user)
                .optional()?)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
            Ok(conn
                .query_row(&sql, params![email], row_to_user)
                .optional()?)
        })
    }

    /// All accounts, newest first
    pub fn list_users(&self) -> StoreResult<Vec<User>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users ORDER BY created_at DESC, id DESC",
                USER_COLUMNS
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let users = stmt
                .query_map([], row_to_user)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(users)
        })
    }

    /// Replace email, name and phone; an email owned by someone else is a `Conflict`
    pub fn update_profile(
        &self,
        user_id: i64,
        email: &str,
        full_name: &str,
        phone: Option<String>,
    ) -> StoreResult<User> {
        let email = normalize_email(email);
        let changed = self.with_conn(|conn| {
            Ok(conn
                .execute(
                    "UPDATE users SET email = ?1, full_name = ?2, phone = ?3 WHERE id = ?4",
                    params![email, full_name.trim(), super::clean_optional(phone), user_id],
                )
                .map_err(|e| StoreError::on_unique(e, "User with this email already exists"))?)
        })?;

        if changed == 0 {
            return Err(StoreError::NotFound("User".to_string()));
        }
        self.get_user(user_id)?
            .ok_or_else(|| StoreError::NotFound("User".to_string()))
    }

    pub fn set_password_hash(&self, user_id: i64, password_hash: &str) -> StoreResult<()> {
        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                params![password_hash, user_id],
            )?)
        })?;
        if changed == 0 {
            return Err(StoreError::NotFound("User".to_string()));
        }
        Ok(())
    }

    pub fn set_admin(&self, user_id: i64, is_admin: bool) -> StoreResult<User> {
        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE users SET is_admin = ?1 WHERE id = ?2",
                params![is_admin, user_id],
            )?)
        })?;
        if changed == 0 {
            return Err(StoreError::NotFound("User".to_string()));
        }
        self.get_user(user_id)?
            .ok_or_else(|| StoreError::NotFound("User".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            full_name: "Test Reader".to_string(),
            phone: None,
            password_hash: "hash".to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn test_create_and_lookup() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user(new_user(" Reader@Example.com ")).unwrap();

        assert_eq!(user.email, "reader@example.com");
        assert!(!user.is_admin);

        let found = store.get_user_by_email("READER@example.com").unwrap().unwrap();
        assert_eq!(found.user_id, user.user_id);
        assert!(store.get_user(user.user_id + 100).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let store = Store::open_in_memory().unwrap();
        store.create_user(new_user("a@example.com")).unwrap();

        let err = store.create_user(new_user("A@example.com")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(err.to_string(), "User with this email already exists");
    }

    #[test]
    fn test_update_profile_conflict() {
        let store = Store::open_in_memory().unwrap();
        store.create_user(new_user("a@example.com")).unwrap();
        let b = store.create_user(new_user("b@example.com")).unwrap();

        let err = store
            .update_profile(b.user_id, "a@example.com", "B", None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let updated = store
            .update_profile(b.user_id, "b2@example.com", " New Name ", Some("+7 900".into()))
            .unwrap();
        assert_eq!(updated.email, "b2@example.com");
        assert_eq!(updated.full_name, "New Name");
        assert_eq!(updated.phone.as_deref(), Some("+7 900"));
    }

    #[test]
    fn test_list_users_newest_first_and_admin_flag() {
        let store = Store::open_in_memory().unwrap();
        let first = store.create_user(new_user("first@example.com")).unwrap();
        let second = store.create_user(new_user("second@example.com")).unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users[0].user_id, second.user_id);
        assert_eq!(users[1].user_id, first.user_id);

        let promoted = store.set_admin(first.user_id, true).unwrap();
        assert!(promoted.is_admin);
        assert!(matches!(
            store.set_admin(999, true),
            Err(StoreError::NotFound(_))
        ));
    }
}
