/// Shared application state
use crate::config::ServerConfig;
use crate::services::{BookService, CredentialService, ImageStore, TokenService};
use shelf_core::storage::{BookStore, UserStore};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub credentials: Arc<CredentialService>,
    pub books: Arc<BookService>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        credentials: Arc<CredentialService>,
        books: Arc<BookService>,
    ) -> Self {
        Self {
            tokens,
            credentials,
            books,
        }
    }

    /// Wire every service from configuration and already-opened stores
    pub fn from_config<S>(config: &ServerConfig, store: Arc<S>, images: Arc<dyn ImageStore>) -> Self
    where
        S: UserStore + BookStore + 'static,
    {
        let image_timeout = Duration::from_secs(config.images.timeout_secs);

        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_expiration_days);

        let users: Arc<dyn UserStore> = store.clone();
        let credentials = CredentialService::new(
            users,
            Arc::clone(&images),
            config.auth.bcrypt_cost,
            image_timeout,
        );

        let books: Arc<dyn BookStore> = store;
        let books = BookService::new(
            books,
            images,
            config.books.default_image.clone(),
            config.books.max_page_size,
            image_timeout,
        );

        Self::new(Arc::new(tokens), Arc::new(credentials), Arc::new(books))
    }
}
