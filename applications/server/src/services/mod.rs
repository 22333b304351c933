/// Server services
pub mod books;
pub mod cloudinary;
pub mod credentials;
pub mod images;
pub mod tokens;

pub use books::{BookService, DeletedBook, ImageCleanup};
pub use cloudinary::CloudinaryImageStore;
pub use credentials::CredentialService;
pub use images::{ImageStore, LocalImageStore, StoredImage};
pub use tokens::{TokenError, TokenService};

use crate::config::{ImageBackend, ImageSettings};
use std::sync::Arc;

/// Build the configured image store, creating local directories as needed
pub async fn build_image_store(settings: &ImageSettings) -> std::io::Result<Arc<dyn ImageStore>> {
    match settings.backend {
        ImageBackend::Local => {
            let store = LocalImageStore::new(
                settings.local.path.clone(),
                settings.local.public_base_url.clone(),
            );
            store.initialize().await?;
            Ok(Arc::new(store))
        }
        ImageBackend::Cloudinary => {
            let c = &settings.cloudinary;
            Ok(Arc::new(CloudinaryImageStore::new(
                c.cloud_name.clone(),
                c.api_key.clone(),
                c.api_secret.clone(),
                c.api_base_url.clone(),
            )))
        }
    }
}
