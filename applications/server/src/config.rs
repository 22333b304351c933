/// Server configuration
use crate::error::{Result, ServerError};
use crate::services::tokens::MAX_TOKEN_EXPIRATION_DAYS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Work factors accepted by bcrypt
const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_images")]
    pub images: ImageSettings,

    #[serde(default = "default_books")]
    pub books: BookSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request body cap; base64 images need room
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_token_expiration_days")]
    pub token_expiration_days: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageBackend {
    Local,
    Cloudinary,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageSettings {
    #[serde(default = "default_image_backend")]
    pub backend: ImageBackend,

    /// Upper bound on a single upload or destroy call
    #[serde(default = "default_image_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_local_images")]
    pub local: LocalImageSettings,

    #[serde(default = "default_cloudinary")]
    pub cloudinary: CloudinarySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalImageSettings {
    #[serde(default = "default_local_image_path")]
    pub path: PathBuf,

    /// Prefix of the URLs handed back to clients
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CloudinarySettings {
    #[serde(default)]
    pub cloud_name: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub api_secret: String,

    #[serde(default = "default_cloudinary_api_base_url")]
    pub api_base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookSettings {
    /// Cover used when a book is created without an image
    #[serde(default = "default_book_image")]
    pub default_image: String,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl ServerConfig {
    /// Load configuration from `config.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from the given file (if present) and environment.
    ///
    /// Environment variables use the `SHELF_` prefix and `__` between
    /// section and key, e.g. `SHELF_AUTH__JWT_SECRET`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("SHELF")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set SHELF_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&self.auth.bcrypt_cost) {
            return Err(ServerError::Config(format!(
                "bcrypt cost must be between {} and {}",
                BCRYPT_MIN_COST, BCRYPT_MAX_COST
            )));
        }

        if self.auth.token_expiration_days == 0
            || self.auth.token_expiration_days > MAX_TOKEN_EXPIRATION_DAYS
        {
            return Err(ServerError::Config(format!(
                "auth.token_expiration_days must be between 1 and {}",
                MAX_TOKEN_EXPIRATION_DAYS
            )));
        }

        if self.books.max_page_size == 0 {
            return Err(ServerError::Config(
                "books.max_page_size must be at least 1".to_string(),
            ));
        }

        if self.images.backend == ImageBackend::Cloudinary {
            let c = &self.images.cloudinary;
            if c.cloud_name.is_empty() || c.api_key.is_empty() || c.api_secret.is_empty() {
                return Err(ServerError::Config(
                    "Cloudinary backend needs cloud_name, api_key and api_secret".to_string(),
                ));
            }
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
        max_body_bytes: default_max_body_bytes(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/shelf.db".to_string()
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        token_expiration_days: default_token_expiration_days(),
        bcrypt_cost: default_bcrypt_cost(),
    }
}

fn default_token_expiration_days() -> u64 {
    30
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_images() -> ImageSettings {
    ImageSettings {
        backend: default_image_backend(),
        timeout_secs: default_image_timeout_secs(),
        local: default_local_images(),
        cloudinary: default_cloudinary(),
    }
}

fn default_image_backend() -> ImageBackend {
    ImageBackend::Local
}

fn default_image_timeout_secs() -> u64 {
    30
}

fn default_local_images() -> LocalImageSettings {
    LocalImageSettings {
        path: default_local_image_path(),
        public_base_url: default_public_base_url(),
    }
}

fn default_local_image_path() -> PathBuf {
    PathBuf::from("./data/images")
}

fn default_public_base_url() -> String {
    "http://localhost:3000/images".to_string()
}

fn default_cloudinary() -> CloudinarySettings {
    CloudinarySettings {
        cloud_name: String::new(),
        api_key: String::new(),
        api_secret: String::new(),
        api_base_url: default_cloudinary_api_base_url(),
    }
}

fn default_cloudinary_api_base_url() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_books() -> BookSettings {
    BookSettings {
        default_image: default_book_image(),
        max_page_size: default_max_page_size(),
    }
}

fn default_book_image() -> String {
    shelf_core::types::DEFAULT_BOOK_IMAGE.to_string()
}

fn default_max_page_size() -> u32 {
    shelf_core::types::MAX_PAGE_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            images: default_images(),
            books: default_books(),
        }
    }
}
