//! Book recommendation types

use super::ids::{BookId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock cover used when a book is created without an image
pub const DEFAULT_BOOK_IMAGE: &str =
    "https://images.unsplash.com/photo-1512820790803-83ca734da794?auto=format&fit=crop&w=500&q=60";

/// Book recommendation as stored. The owner is serialized as `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub caption: String,
    pub rating: u8,
    pub image: String,
    /// Image store handle, set only when this book uploaded its own cover
    #[serde(skip)]
    pub image_ref: Option<String>,
    #[serde(rename = "user")]
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public owner fields joined onto listed books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookOwner {
    pub id: UserId,
    pub username: String,
    pub profile_image: String,
}

/// Book with its owner resolved, as returned by listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookWithOwner {
    pub id: BookId,
    pub title: String,
    pub caption: String,
    pub rating: u8,
    pub image: String,
    #[serde(rename = "user")]
    pub owner: BookOwner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated data for a new book. `image` is already a durable URL.
#[derive(Debug, Clone)]
pub struct CreateBook {
    pub owner: UserId,
    pub title: String,
    pub caption: String,
    pub rating: u8,
    pub image: String,
    /// Reference of an image uploaded for this book; `None` for the default
    /// cover and client-supplied URLs
    pub image_ref: Option<String>,
}

/// Validated replacement values for the mutable book fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBook {
    pub title: String,
    pub caption: String,
    pub rating: u8,
}

/// One page of the global feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPage {
    pub books: Vec<BookWithOwner>,
    pub total_pages: u32,
    pub current_page: u32,
}
