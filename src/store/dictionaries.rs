//! Genres, authors and publishers
//!
//! All three tables share the same shape (id + one name column), so the
//! SQL is driven by [`DictKind`] and typed wrappers sit on top.

use rusqlite::{params, Connection, OptionalExtension};

use super::types::{Author, DictKind, Genre, Publisher};
use super::{Store, StoreError, StoreResult};

impl DictKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            DictKind::Genre => "genres",
            DictKind::Author => "authors",
            DictKind::Publisher => "publishers",
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            DictKind::Author => "full_name",
            DictKind::Genre | DictKind::Publisher => "name",
        }
    }
}

fn list_entries(conn: &Connection, kind: DictKind) -> StoreResult<Vec<(i64, String)>> {
    let sql = format!(
        "SELECT id, {col} FROM {table} ORDER BY {col} ASC, id ASC",
        col = kind.column(),
        table = kind.table()
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn get_entry(conn: &Connection, kind: DictKind, id: i64) -> StoreResult<Option<(i64, String)>> {
    let sql = format!(
        "SELECT id, {} FROM {} WHERE id = ?1",
        kind.column(),
        kind.table()
    );
    Ok(conn
        .query_row(&sql, params![id], |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()?)
}

fn validate_name(kind: DictKind, name: &str) -> StoreResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Invalid(format!(
            "{} name must not be empty",
            kind.label()
        )));
    }
    Ok(name.to_string())
}

fn duplicate_message(kind: DictKind) -> String {
    format!("{} with this name already exists", kind.label())
}

/// Look up an entry by exact trimmed name, inserting it when missing
pub(crate) fn find_or_create(conn: &Connection, kind: DictKind, name: &str) -> StoreResult<Option<i64>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    let select = format!(
        "SELECT id FROM {} WHERE {} = ?1 ORDER BY id LIMIT 1",
        kind.table(),
        kind.column()
    );
    if let Some(id) = conn
        .query_row(&select, params![name], |row| row.get::<_, i64>(0))
        .optional()?
    {
        return Ok(Some(id));
    }

    let insert = format!(
        "INSERT INTO {} ({}) VALUES (?1)",
        kind.table(),
        kind.column()
    );
    conn.execute(&insert, params![name])?;
    tracing::debug!(kind = kind.label(), name = %name, "Created dictionary entry");
    Ok(Some(conn.last_insert_rowid()))
}

impl Store {
    /// All entries of one dictionary, sorted by name
    pub fn list_dict(&self, kind: DictKind) -> StoreResult<Vec<(i64, String)>> {
        self.with_conn(|conn| list_entries(conn, kind))
    }

    pub fn get_dict(&self, kind: DictKind, id: i64) -> StoreResult<Option<(i64, String)>> {
        self.with_conn(|conn| get_entry(conn, kind, id))
    }

    pub fn create_dict(&self, kind: DictKind, name: &str) -> StoreResult<(i64, String)> {
        let name = validate_name(kind, name)?;
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO {} ({}) VALUES (?1)",
                kind.table(),
                kind.column()
            );
            conn.execute(&sql, params![name])
                .map_err(|e| StoreError::on_unique(e, duplicate_message(kind)))?;
            Ok((conn.last_insert_rowid(), name))
        })
    }

    pub fn rename_dict(&self, kind: DictKind, id: i64, name: &str) -> StoreResult<(i64, String)> {
        let name = validate_name(kind, name)?;
        self.with_conn(|conn| {
            let sql = format!(
                "UPDATE {} SET {} = ?1 WHERE id = ?2",
                kind.table(),
                kind.column()
            );
            let changed = conn
                .execute(&sql, params![name, id])
                .map_err(|e| StoreError::on_unique(e, duplicate_message(kind)))?;
            if changed == 0 {
                return Err(StoreError::NotFound(kind.label().to_string()));
            }
            Ok((id, name))
        })
    }

    /// Delete an entry; books referencing it lose the reference
    pub fn delete_dict(&self, kind: DictKind, id: i64) -> StoreResult<()> {
        self.with_conn(|conn| {
            let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
            let changed = conn.execute(&sql, params![id])?;
            if changed == 0 {
                return Err(StoreError::NotFound(kind.label().to_string()));
            }
            Ok(())
        })
    }

    pub fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        Ok(self
            .list_dict(DictKind::Genre)?
            .into_iter()
            .map(|(genre_id, name)| Genre { genre_id, name })
            .collect())
    }

    pub fn list_authors(&self) -> StoreResult<Vec<Author>> {
        Ok(self
            .list_dict(DictKind::Author)?
            .into_iter()
            .map(|(author_id, full_name)| Author { author_id, full_name })
            .collect())
    }

    pub fn list_publishers(&self) -> StoreResult<Vec<Publisher>> {
        Ok(self
            .list_dict(DictKind::Publisher)?
            .into_iter()
            .map(|(publisher_id, name)| Publisher { publisher_id, name })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::{BookPatch, NewBook};
    use crate::store::Money;

    #[test]
    fn test_create_list_rename_delete() {
        let store = Store::open_in_memory().unwrap();

        let (fantasy, _) = store.create_dict(DictKind::Genre, " Fantasy ").unwrap();
        store.create_dict(DictKind::Genre, "Drama").unwrap();

        let genres = store.list_genres().unwrap();
        let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Drama", "Fantasy"]);

        let (_, renamed) = store.rename_dict(DictKind::Genre, fantasy, "Sci-Fi").unwrap();
        assert_eq!(renamed, "Sci-Fi");

        store.delete_dict(DictKind::Genre, fantasy).unwrap();
        assert!(store.get_dict(DictKind::Genre, fantasy).unwrap().is_none());
        assert!(matches!(
            store.delete_dict(DictKind::Genre, fantasy),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_and_empty_names() {
        let store = Store::open_in_memory().unwrap();
        store.create_dict(DictKind::Publisher, "Penguin").unwrap();

        assert!(matches!(
            store.create_dict(DictKind::Publisher, "Penguin"),
            Err(StoreError::Conflict(_))
        ));
        assert!(matches!(
            store.create_dict(DictKind::Author, "   "),
            Err(StoreError::Invalid(_))
        ));
        // Authors may share a name
        store.create_dict(DictKind::Author, "John Smith").unwrap();
        store.create_dict(DictKind::Author, "John Smith").unwrap();
        assert_eq!(store.list_authors().unwrap().len(), 2);
    }

    #[test]
    fn test_find_or_create_reuses_trimmed_name() {
        let store = Store::open_in_memory().unwrap();
        let (a, b, blank) = store
            .with_conn(|conn| {
                let a = find_or_create(conn, DictKind::Genre, "Poetry")?;
                let b = find_or_create(conn, DictKind::Genre, "  Poetry ")?;
                let blank = find_or_create(conn, DictKind::Genre, "  ")?;
                Ok((a, b, blank))
            })
            .unwrap();
        assert_eq!(a, b);
        assert!(blank.is_none());
        assert_eq!(store.list_genres().unwrap().len(), 1);
    }

    #[test]
    fn test_deleting_genre_detaches_books() {
        let store = Store::open_in_memory().unwrap();
        let book = store
            .create_book(NewBook {
                title: "Odes".into(),
                price: Money::from_units(100),
                genre_name: Some("Poetry".into()),
                ..Default::default()
            })
            .unwrap();
        let genre_id = book.genre_id.unwrap();

        store.delete_dict(DictKind::Genre, genre_id).unwrap();

        let book = store.get_book(book.book_id).unwrap().unwrap();
        assert_eq!(book.genre_id, None);
        assert_eq!(book.genre_name, None);

        // Updating with an unrelated patch still works afterwards
        store
            .update_book(book.book_id, BookPatch { pages: Some(Some(10)), ..Default::default() })
            .unwrap();
    }
}
