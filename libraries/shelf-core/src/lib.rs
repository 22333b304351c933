//! Shelf Core
//!
//! Platform-agnostic domain types, validation rules, storage traits and error
//! handling for the Shelf book recommendation service.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Book`, typed ids, pagination
//! - **Validation**: field limits shared by every write path
//! - **Storage Traits**: `UserStore`, `BookStore`
//! - **Error Handling**: Unified `ShelfError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use shelf_core::types::PageRequest;
//! use shelf_core::validation::BookInput;
//!
//! let fields = BookInput::new("Dune", "A desert epic saga", 5).validate().unwrap();
//! assert_eq!(fields.rating, 5);
//!
//! let page = PageRequest::from_query(Some("2"), Some("10"), 100);
//! assert_eq!(page.offset(), 10);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{Result, ShelfError};
pub use storage::{BookStore, UserStore};

pub use types::{
    Book, BookId, BookOwner, BookPage, BookWithOwner, CreateBook, CreateUser, PageRequest,
    PublicUser, UpdateBook, UpdateProfile, User, UserId,
};
