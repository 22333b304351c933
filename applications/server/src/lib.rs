//! Shelf Server Library
//!
//! Book recommendation backend with bearer-token authentication,
//! ownership-checked book CRUD and pluggable image storage.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use api::{router, RouterOptions};
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::{BookService, CredentialService, ImageStore, TokenService};
pub use state::AppState;
