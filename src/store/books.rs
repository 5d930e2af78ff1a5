//! Catalog persistence
//!
//! Books reference at most one genre and one publisher and any number of
//! authors. Create and update accept dictionary names as well as ids;
//! names are resolved through `dictionaries::find_or_create`.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::dictionaries::find_or_create;
use super::types::{Book, BookPatch, BookQuery, DictKind, Money, NewBook, MAX_BOOK_LIMIT};
use super::{clean_optional, Store, StoreError, StoreResult};

const BOOK_SELECT: &str = "
    SELECT b.id, b.title, b.description, b.price_cents, b.publication_year, b.pages,
           b.isbn, b.cover_image, b.genre_id, b.publisher_id, g.name, p.name
    FROM books b
    LEFT JOIN genres g ON g.id = b.genre_id
    LEFT JOIN publishers p ON p.id = b.publisher_id";

const ISBN_TAKEN: &str = "Book with this ISBN already exists";

fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        book_id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: Money::from_cents(row.get(3)?),
        publication_year: row.get(4)?,
        pages: row.get(5)?,
        isbn: row.get(6)?,
        cover_image: row.get(7)?,
        genre_id: row.get(8)?,
        publisher_id: row.get(9)?,
        author_ids: Vec::new(),
        author_names: Vec::new(),
        genre_name: row.get(10)?,
        publisher_name: row.get(11)?,
    })
}

fn attach_authors(conn: &Connection, book: &mut Book) -> StoreResult<()> {
    let mut stmt = conn.prepare_cached(
        "SELECT a.id, a.full_name FROM book_authors ba
         JOIN authors a ON a.id = ba.author_id
         WHERE ba.book_id = ?1
         ORDER BY a.id",
    )?;
    let authors = stmt
        .query_map(params![book.book_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    (book.author_ids, book.author_names) = authors.into_iter().unzip();
    Ok(())
}

fn load_book(conn: &Connection, book_id: i64) -> StoreResult<Option<Book>> {
    let sql = format!("{} WHERE b.id = ?1", BOOK_SELECT);
    let book = conn
        .query_row(&sql, params![book_id], row_to_book)
        .optional()?;
    match book {
        Some(mut book) => {
            attach_authors(conn, &mut book)?;
            Ok(Some(book))
        }
        None => Ok(None),
    }
}

fn ensure_exists(conn: &Connection, kind: DictKind, id: i64) -> StoreResult<()> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", kind.table());
    let found = conn
        .query_row(&sql, params![id], |_| Ok(()))
        .optional()?
        .is_some();
    if found {
        Ok(())
    } else {
        Err(StoreError::Invalid(format!(
            "{} {} does not exist",
            kind.label(),
            id
        )))
    }
}

/// Explicit id wins; otherwise the trimmed name is resolved or created
fn resolve_ref(
    conn: &Connection,
    kind: DictKind,
    id: Option<i64>,
    name: Option<&str>,
) -> StoreResult<Option<i64>> {
    match (id, name) {
        (Some(id), _) => {
            ensure_exists(conn, kind, id)?;
            Ok(Some(id))
        }
        (None, Some(name)) => find_or_create(conn, kind, name),
        (None, None) => Ok(None),
    }
}

/// Union of explicit author ids and resolved names, first occurrence order
fn resolve_authors(conn: &Connection, ids: &[i64], names: &[String]) -> StoreResult<Vec<i64>> {
    let mut resolved: Vec<i64> = Vec::with_capacity(ids.len() + names.len());
    for &id in ids {
        ensure_exists(conn, DictKind::Author, id)?;
        if !resolved.contains(&id) {
            resolved.push(id);
        }
    }
    for name in names {
        if let Some(id) = find_or_create(conn, DictKind::Author, name)? {
            if !resolved.contains(&id) {
                resolved.push(id);
            }
        }
    }
    Ok(resolved)
}

fn replace_authors(conn: &Connection, book_id: i64, author_ids: &[i64]) -> StoreResult<()> {
    conn.execute("DELETE FROM book_authors WHERE book_id = ?1", params![book_id])?;
    let mut stmt =
        conn.prepare_cached("INSERT INTO book_authors (book_id, author_id) VALUES (?1, ?2)")?;
    for author_id in author_ids {
        stmt.execute(params![book_id, author_id])?;
    }
    Ok(())
}

fn validate_fields(title: &str, price: Money, year: Option<i32>, pages: Option<i32>) -> StoreResult<()> {
    if title.trim().is_empty() {
        return Err(StoreError::Invalid("Title must not be empty".to_string()));
    }
    if price.is_negative() {
        return Err(StoreError::Invalid("Price must not be negative".to_string()));
    }
    if matches!(year, Some(y) if !(0..=9999).contains(&y)) {
        return Err(StoreError::Invalid("Publication year is out of range".to_string()));
    }
    if matches!(pages, Some(p) if p <= 0) {
        return Err(StoreError::Invalid("Pages must be positive".to_string()));
    }
    Ok(())
}

impl Store {
    /// Filtered, ordered, paginated catalog listing
    pub fn list_books(&self, query: &BookQuery) -> StoreResult<Vec<Book>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(q) = clean_optional(query.q.clone()) {
            clauses.push("instr(b.title_folded, ?) > 0");
            values.push(Value::Text(q.to_lowercase()));
        }
        if let Some(genre_id) = query.genre_id {
            clauses.push("b.genre_id = ?");
            values.push(Value::Integer(genre_id));
        }
        if let Some(author_id) = query.author_id {
            clauses.push(
                "EXISTS (SELECT 1 FROM book_authors ba WHERE ba.book_id = b.id AND ba.author_id = ?)",
            );
            values.push(Value::Integer(author_id));
        }
        if let Some(publisher_id) = query.publisher_id {
            clauses.push("b.publisher_id = ?");
            values.push(Value::Integer(publisher_id));
        }
        if let Some(min_price) = query.min_price {
            clauses.push("b.price_cents >= ?");
            values.push(Value::Integer(min_price.cents()));
        }
        if let Some(max_price) = query.max_price {
            clauses.push("b.price_cents <= ?");
            values.push(Value::Integer(max_price.cents()));
        }
        if let Some(min_year) = query.min_year {
            clauses.push("b.publication_year >= ?");
            values.push(Value::Integer(min_year.into()));
        }
        if let Some(max_year) = query.max_year {
            clauses.push("b.publication_year <= ?");
            values.push(Value::Integer(max_year.into()));
        }

        let mut sql = BOOK_SELECT.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        let order = query.order_by.map(|o| o.sql()).unwrap_or("b.id ASC");
        sql.push_str(&format!(" ORDER BY {} LIMIT ? OFFSET ?", order));
        values.push(Value::Integer(query.limit.min(MAX_BOOK_LIMIT).into()));
        values.push(Value::Integer(query.skip.into()));

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut books = stmt
                .query_map(params_from_iter(values.iter()), row_to_book)?
                .collect::<Result<Vec<_>, _>>()?;
            for book in &mut books {
                attach_authors(conn, book)?;
            }
            Ok(books)
        })
    }

    pub fn get_book(&self, book_id: i64) -> StoreResult<Option<Book>> {
        self.with_conn(|conn| load_book(conn, book_id))
    }

    pub fn create_book(&self, new: NewBook) -> StoreResult<Book> {
        validate_fields(&new.title, new.price, new.publication_year, new.pages)?;

        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let genre_id = resolve_ref(&tx, DictKind::Genre, new.genre_id, new.genre_name.as_deref())?;
            let publisher_id = resolve_ref(
                &tx,
                DictKind::Publisher,
                new.publisher_id,
                new.publisher_name.as_deref(),
            )?;
            let author_ids = resolve_authors(&tx, &new.author_ids, &new.author_names)?;

            let title = new.title.trim();
            tx.execute(
                "INSERT INTO books (title, title_folded, description, price_cents,
                                    publication_year, pages, isbn, genre_id, publisher_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    title,
                    title.to_lowercase(),
                    clean_optional(new.description),
                    new.price.cents(),
                    new.publication_year,
                    new.pages,
                    clean_optional(new.isbn),
                    genre_id,
                    publisher_id
                ],
            )
            .map_err(|e| StoreError::on_unique(e, ISBN_TAKEN))?;
            let book_id = tx.last_insert_rowid();
            replace_authors(&tx, book_id, &author_ids)?;

            let book = load_book(&tx, book_id)?
                .ok_or_else(|| StoreError::NotFound("Book".to_string()))?;
            tx.commit()?;
            Ok(book)
        })
    }

    /// Apply a partial update
    ///
    /// `Some(None)` clears a nullable column; a blank or `null`
    /// `genre_name`/`publisher_name` clears the reference.
    pub fn update_book(&self, book_id: i64, patch: BookPatch) -> StoreResult<Book> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut book =
                load_book(&tx, book_id)?.ok_or_else(|| StoreError::NotFound("Book".to_string()))?;

            if let Some(title) = patch.title {
                book.title = title.trim().to_string();
            }
            if let Some(description) = patch.description {
                book.description = clean_optional(description);
            }
            if let Some(price) = patch.price {
                book.price = price;
            }
            if let Some(year) = patch.publication_year {
                book.publication_year = year;
            }
            if let Some(pages) = patch.pages {
                book.pages = pages;
            }
            if let Some(isbn) = patch.isbn {
                book.isbn = clean_optional(isbn);
            }
            validate_fields(&book.title, book.price, book.publication_year, book.pages)?;

            if patch.genre_id.is_some() || patch.genre_name.is_some() {
                book.genre_id = resolve_ref(
                    &tx,
                    DictKind::Genre,
                    patch.genre_id.flatten(),
                    patch.genre_name.flatten().as_deref(),
                )?;
            }
            if patch.publisher_id.is_some() || patch.publisher_name.is_some() {
                book.publisher_id = resolve_ref(
                    &tx,
                    DictKind::Publisher,
                    patch.publisher_id.flatten(),
                    patch.publisher_name.flatten().as_deref(),
                )?;
            }

            tx.execute(
                "UPDATE books SET title = ?1, title_folded = ?2, description = ?3,
                        price_cents = ?4, publication_year = ?5, pages = ?6, isbn = ?7,
                        genre_id = ?8, publisher_id = ?9
                 WHERE id = ?10",
                params![
                    book.title,
                    book.title.to_lowercase(),
                    book.description,
                    book.price.cents(),
                    book.publication_year,
                    book.pages,
                    book.isbn,
                    book.genre_id,
                    book.publisher_id,
                    book_id
                ],
            )
            .map_err(|e| StoreError::on_unique(e, ISBN_TAKEN))?;

            if patch.author_ids.is_some() || patch.author_names.is_some() {
                let ids = patch.author_ids.unwrap_or_default();
                let names = patch.author_names.unwrap_or_default();
                let author_ids = resolve_authors(&tx, &ids, &names)?;
                replace_authors(&tx, book_id, &author_ids)?;
            }

            let book = load_book(&tx, book_id)?
                .ok_or_else(|| StoreError::NotFound("Book".to_string()))?;
            tx.commit()?;
            Ok(book)
        })
    }

    pub fn delete_book(&self, book_id: i64) -> StoreResult<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM books WHERE id = ?1", params![book_id])?;
            if changed == 0 {
                return Err(StoreError::NotFound("Book".to_string()));
            }
            Ok(())
        })
    }

    /// Point the book at a stored cover image; returns the previous value
    pub fn set_cover(&self, book_id: i64, cover_image: &str) -> StoreResult<(Book, Option<String>)> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let previous = load_book(&tx, book_id)?
                .ok_or_else(|| StoreError::NotFound("Book".to_string()))?
                .cover_image;
            tx.execute(
                "UPDATE books SET cover_image = ?1 WHERE id = ?2",
                params![cover_image, book_id],
            )?;
            let book = load_book(&tx, book_id)?
                .ok_or_else(|| StoreError::NotFound("Book".to_string()))?;
            tx.commit()?;
            Ok((book, previous))
        })
    }
}
