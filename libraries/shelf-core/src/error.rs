/// Core error types for Shelf
use thiserror::Error;

/// Result type alias using `ShelfError`
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Core error type for Shelf
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Missing or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// A unique field (username, email) is already taken
    #[error("{field} already exists")]
    Duplicate { field: String },

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Authenticated caller does not own the entity
    #[error("Not authorized to modify this {0}")]
    Forbidden(String),

    /// Login failed. Unknown email and wrong password are not distinguished.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// External media service failed or timed out
    #[error("Image store error: {0}")]
    Upstream(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl ShelfError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a duplicate-field error
    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a forbidden error for an entity kind
    pub fn forbidden(entity: impl Into<String>) -> Self {
        Self::Forbidden(entity.into())
    }

    /// Create an upstream (image store) error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for ShelfError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
