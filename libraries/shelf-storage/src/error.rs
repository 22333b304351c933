/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// A UNIQUE constraint rejected the write
    #[error("{field} already exists")]
    Duplicate { field: String },

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Conditional write matched a row owned by someone else
    #[error("Not authorized to modify this {entity}")]
    Forbidden { entity: String },

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(entity: impl Into<String>) -> Self {
        Self::Forbidden {
            entity: entity.into(),
        }
    }

    /// Translate a write error, turning UNIQUE violations on `users` into
    /// `Duplicate` with a client-facing field name.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = if db_err.message().contains("users.email") {
                    "Email"
                } else if db_err.message().contains("users.username") {
                    "Username"
                } else {
                    "Record"
                };
                return Self::Duplicate {
                    field: field.to_string(),
                };
            }
        }
        Self::Database(err)
    }
}

impl From<StorageError> for shelf_core::ShelfError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate { field } => shelf_core::ShelfError::duplicate(field),
            StorageError::NotFound { entity, id } => shelf_core::ShelfError::not_found(entity, id),
            StorageError::Forbidden { entity } => shelf_core::ShelfError::forbidden(entity),
            other => shelf_core::ShelfError::storage(other.to_string()),
        }
    }
}
