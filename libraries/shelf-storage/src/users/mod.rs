//! User account queries

use crate::error::{Result, StorageError};
use chrono::Utc;
use shelf_core::types::{CreateUser, UpdateProfile, User, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, profile_image, created_at, updated_at";

fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        profile_image: row.try_get("profile_image")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a new user
///
/// # Errors
///
/// Returns `StorageError::Duplicate` if the username or email is taken
pub async fn create(pool: &SqlitePool, user: CreateUser) -> Result<User> {
    let id = UserId::generate();
    let now = Utc::now();

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO users (id, username, email, password_hash, profile_image, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.profile_image)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(StorageError::from_write)?;

    Ok(user_from_row(&row)?)
}

/// Get user by ID
pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(user_from_row).transpose()?)
}

/// Get user by email (case-insensitive through the column collation)
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(user_from_row).transpose()?)
}

/// Get user by exact username
pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(user_from_row).transpose()?)
}

/// Get all users
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(user_from_row)
        .collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Apply a partial profile update.
///
/// Fields left as `None` keep their stored value. The password hash is
/// never touched here.
pub async fn update_profile(
    pool: &SqlitePool,
    id: &UserId,
    update: UpdateProfile,
) -> Result<User> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE users
        SET username = COALESCE(?, username),
            profile_image = COALESCE(?, profile_image),
            updated_at = ?
        WHERE id = ?
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(update.username)
    .bind(update.profile_image)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(StorageError::from_write)?
    .ok_or_else(|| StorageError::not_found("User", id.as_str()))?;

    Ok(user_from_row(&row)?)
}
