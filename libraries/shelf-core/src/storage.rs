//! Storage traits for users and books
//!
//! The credential side and the book side are separate traits: each
//! repository owns its own records and never writes the other's.

use crate::error::Result;
use crate::types::{
    Book, BookId, BookWithOwner, CreateBook, CreateUser, PageRequest, UpdateBook, UpdateProfile,
    User, UserId,
};
use async_trait::async_trait;

/// Persistence for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    // ========================================================================
    // Reads
    // ========================================================================

    /// Get user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get user by (normalized) email, case-insensitive
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get user by exact username
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get all users ordered by username
    async fn get_all_users(&self) -> Result<Vec<User>>;

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert a new user.
    ///
    /// Fails with `ShelfError::Duplicate` when the username or email is taken,
    /// even if a concurrent registration slipped past the caller's pre-checks.
    async fn create_user(&self, user: CreateUser) -> Result<User>;

    /// Apply a partial profile update and bump `updated_at`
    async fn update_profile(&self, id: &UserId, update: UpdateProfile) -> Result<User>;
}

/// Persistence for book recommendations
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a new book
    async fn create_book(&self, book: CreateBook) -> Result<Book>;

    /// Get a single book with its owner joined
    async fn get_book(&self, id: &BookId) -> Result<Option<BookWithOwner>>;

    /// One page of all books, newest first, plus the total book count
    async fn list_books(&self, page: PageRequest) -> Result<(Vec<BookWithOwner>, u64)>;

    /// All books of one owner, newest first
    async fn list_books_by_owner(&self, owner: &UserId) -> Result<Vec<BookWithOwner>>;

    /// Replace title, caption and rating if `owner` owns the book.
    ///
    /// Ownership check and write happen in one statement. Fails with
    /// `NotFound` if the book does not exist (including when it was deleted
    /// concurrently) and `Forbidden` if someone else owns it.
    async fn update_owned_book(
        &self,
        id: &BookId,
        owner: &UserId,
        update: UpdateBook,
    ) -> Result<Book>;

    /// Delete the book if `owner` owns it and return the removed row.
    /// Same failure classification as [`BookStore::update_owned_book`].
    async fn delete_owned_book(&self, id: &BookId, owner: &UserId) -> Result<Book>;
}
