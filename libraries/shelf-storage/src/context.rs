use crate::{books, users};
use async_trait::async_trait;
use shelf_core::{
    error::Result,
    storage::{BookStore, UserStore},
    types::*,
};
use sqlx::SqlitePool;

/// `SQLite`-backed implementation of both storage traits
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) and migrate the database at `database_url`
    pub async fn connect(database_url: &str) -> crate::error::Result<Self> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(users::get_by_id(&self.pool, id).await?)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(users::get_by_email(&self.pool, email).await?)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(users::get_by_username(&self.pool, username).await?)
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        Ok(users::get_all(&self.pool).await?)
    }

    async fn create_user(&self, user: CreateUser) -> Result<User> {
        Ok(users::create(&self.pool, user).await?)
    }

    async fn update_profile(&self, id: &UserId, update: UpdateProfile) -> Result<User> {
        Ok(users::update_profile(&self.pool, id, update).await?)
    }
}

#[async_trait]
impl BookStore for SqliteStore {
    async fn create_book(&self, book: CreateBook) -> Result<Book> {
        Ok(books::create(&self.pool, book).await?)
    }

    async fn get_book(&self, id: &BookId) -> Result<Option<BookWithOwner>> {
        Ok(books::get_by_id(&self.pool, id).await?)
    }

    async fn list_books(&self, page: PageRequest) -> Result<(Vec<BookWithOwner>, u64)> {
        Ok(books::list_page(&self.pool, page).await?)
    }

    async fn list_books_by_owner(&self, owner: &UserId) -> Result<Vec<BookWithOwner>> {
        Ok(books::list_by_owner(&self.pool, owner).await?)
    }

    async fn update_owned_book(
        &self,
        id: &BookId,
        owner: &UserId,
        update: UpdateBook,
    ) -> Result<Book> {
        Ok(books::update_owned(&self.pool, id, owner, update).await?)
    }

    async fn delete_owned_book(&self, id: &BookId, owner: &UserId) -> Result<Book> {
        Ok(books::delete_owned(&self.pool, id, owner).await?)
    }
}
