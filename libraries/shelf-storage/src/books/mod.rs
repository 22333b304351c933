//! Book recommendation queries
//!
//! Listings always join the owner's public fields and order newest first,
//! with insertion order breaking ties between equal timestamps.

use crate::error::{Result, StorageError};
use chrono::Utc;
use shelf_core::types::{
    Book, BookId, BookOwner, BookWithOwner, CreateBook, PageRequest, UpdateBook, UserId,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const BOOK_COLUMNS: &str =
    "id, title, caption, rating, image, image_ref, owner_id, created_at, updated_at";

const JOINED_SELECT: &str = r#"
    SELECT b.id, b.title, b.caption, b.rating, b.image, b.owner_id,
           b.created_at, b.updated_at,
           u.username AS owner_username, u.profile_image AS owner_profile_image
    FROM books b
    INNER JOIN users u ON u.id = b.owner_id
"#;

const NEWEST_FIRST: &str = "ORDER BY b.created_at DESC, b.rowid DESC";

fn book_from_row(row: &SqliteRow) -> std::result::Result<Book, sqlx::Error> {
    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        caption: row.try_get("caption")?,
        rating: row.try_get("rating")?,
        image: row.try_get("image")?,
        image_ref: row.try_get("image_ref")?,
        owner: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn joined_from_row(row: &SqliteRow) -> std::result::Result<BookWithOwner, sqlx::Error> {
    Ok(BookWithOwner {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        caption: row.try_get("caption")?,
        rating: row.try_get("rating")?,
        image: row.try_get("image")?,
        owner: BookOwner {
            id: row.try_get("owner_id")?,
            username: row.try_get("owner_username")?,
            profile_image: row.try_get("owner_profile_image")?,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a new book
pub async fn create(pool: &SqlitePool, book: CreateBook) -> Result<Book> {
    let id = BookId::generate();
    let now = Utc::now();

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO books (id, title, caption, rating, image, image_ref, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {BOOK_COLUMNS}
        "#
    ))
    .bind(&id)
    .bind(&book.title)
    .bind(&book.caption)
    .bind(book.rating)
    .bind(&book.image)
    .bind(&book.image_ref)
    .bind(&book.owner)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(StorageError::from_write)?;

    Ok(book_from_row(&row)?)
}

/// Get a book with its owner joined
pub async fn get_by_id(pool: &SqlitePool, id: &BookId) -> Result<Option<BookWithOwner>> {
    let row = sqlx::query(&format!("{JOINED_SELECT} WHERE b.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(joined_from_row).transpose()?)
}

/// Count all books
pub async fn count(pool: &SqlitePool) -> Result<u64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await?;

    Ok(u64::try_from(total).unwrap_or(0))
}

/// One page of the global feed plus the total number of books
pub async fn list_page(pool: &SqlitePool, page: PageRequest) -> Result<(Vec<BookWithOwner>, u64)> {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

    let rows = sqlx::query(&format!("{JOINED_SELECT} {NEWEST_FIRST} LIMIT ? OFFSET ?"))
        .bind(i64::from(page.limit()))
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let books = rows
        .iter()
        .map(joined_from_row)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total = count(pool).await?;
    Ok((books, total))
}

/// All books owned by one user, newest first
pub async fn list_by_owner(pool: &SqlitePool, owner: &UserId) -> Result<Vec<BookWithOwner>> {
    let rows = sqlx::query(&format!("{JOINED_SELECT} WHERE b.owner_id = ? {NEWEST_FIRST}"))
        .bind(owner)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(joined_from_row)
        .collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Update title, caption and rating in one conditional statement
pub async fn update_owned(
    pool: &SqlitePool,
    id: &BookId,
    owner: &UserId,
    update: UpdateBook,
) -> Result<Book> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE books
        SET title = ?, caption = ?, rating = ?, updated_at = ?
        WHERE id = ? AND owner_id = ?
        RETURNING {BOOK_COLUMNS}
        "#
    ))
    .bind(&update.title)
    .bind(&update.caption)
    .bind(update.rating)
    .bind(Utc::now())
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(book_from_row(&row)?),
        None => Err(classify_miss(pool, id).await),
    }
}

/// Delete in one conditional statement and return the removed row
pub async fn delete_owned(pool: &SqlitePool, id: &BookId, owner: &UserId) -> Result<Book> {
    let row = sqlx::query(&format!(
        "DELETE FROM books WHERE id = ? AND owner_id = ? RETURNING {BOOK_COLUMNS}"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(book_from_row(&row)?),
        None => Err(classify_miss(pool, id).await),
    }
}

/// Explain why a conditional write matched nothing.
///
/// Owners never change, so a row that exists now belonged to someone else
/// at write time. A row that is gone was never there or was deleted in
/// between; both read as not found.
async fn classify_miss(pool: &SqlitePool, id: &BookId) -> StorageError {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await;

    match exists {
        Ok(0) => StorageError::not_found("Book", id.as_str()),
        Ok(_) => StorageError::forbidden("book"),
        Err(e) => StorageError::Database(e),
    }
}
