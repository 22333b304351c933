/// Image store - accepts base64 payloads and hands back durable URLs
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shelf_core::{Result, ShelfError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use uuid::Uuid;

/// Where an uploaded image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Public URL saved on the record
    pub url: String,
    /// Store-specific handle accepted by [`ImageStore::destroy`]
    pub reference: String,
}

/// Adapter over a place that can hold images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `payload` (a `data:` URI or bare base64) under `folder`
    async fn upload(&self, payload: &str, folder: &str) -> Result<StoredImage>;

    /// Remove a previously stored image
    async fn destroy(&self, reference: &str) -> Result<()>;
}

/// Upload with an upper bound on how long the store may take
pub async fn upload_with_timeout(
    store: &dyn ImageStore,
    payload: &str,
    folder: &str,
    timeout: Duration,
) -> Result<StoredImage> {
    match tokio::time::timeout(timeout, store.upload(payload, folder)).await {
        Ok(result) => result,
        Err(_) => Err(ShelfError::upstream(format!(
            "upload timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Destroy with an upper bound on how long the store may take
pub async fn destroy_with_timeout(
    store: &dyn ImageStore,
    reference: &str,
    timeout: Duration,
) -> Result<()> {
    match tokio::time::timeout(timeout, store.destroy(reference)).await {
        Ok(result) => result,
        Err(_) => Err(ShelfError::upstream(format!(
            "destroy timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Decoded image payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Parse a `data:<mime>;base64,<data>` URI or bare base64.
    ///
    /// Bare base64 gets its type sniffed from the leading bytes.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();

        let (declared_mime, data) = match raw.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| ShelfError::validation("Malformed image data URI"))?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| ShelfError::validation("Image data URI must be base64"))?;
                (Some(mime.to_ascii_lowercase()), data)
            }
            None => (None, raw),
        };

        let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|_| ShelfError::validation("Image is not valid base64"))?;
        if bytes.is_empty() {
            return Err(ShelfError::validation("Image is empty"));
        }

        let mime = match declared_mime {
            Some(mime) => mime,
            None => sniff_mime(&bytes)
                .ok_or_else(|| ShelfError::validation("Unrecognized image format"))?
                .to_string(),
        };
        if !mime.starts_with("image/") {
            return Err(ShelfError::validation("Payload is not an image"));
        }

        Ok(Self { mime, bytes })
    }

    /// File extension for the payload's type
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            "image/avif" => "avif",
            _ => "img",
        }
    }

    /// Re-encode as a data URI
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// A folder name or file name we are willing to put on disk
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// `<folder>/<file>` with both parts safe
fn is_safe_reference(reference: &str) -> bool {
    match reference.split_once('/') {
        Some((folder, file)) => is_safe_segment(folder) && is_safe_segment(file),
        None => false,
    }
}

/// Disk-backed image store; files are served back under `public_base_url`
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(base_path: PathBuf, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create the base directory
    pub async fn initialize(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.base_path).await
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, payload: &str, folder: &str) -> Result<StoredImage> {
        if !is_safe_segment(folder) {
            return Err(ShelfError::validation("Invalid image folder"));
        }
        let image = ImagePayload::parse(payload)?;

        let file_name = format!("{}.{}", Uuid::new_v4(), image.extension());
        let dir = self.base_path.join(folder);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ShelfError::upstream(format!("create {}: {}", dir.display(), e)))?;

        let path = dir.join(&file_name);
        fs::write(&path, &image.bytes)
            .await
            .map_err(|e| ShelfError::upstream(format!("write {}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "Stored image");

        Ok(StoredImage {
            url: format!("{}/{}/{}", self.public_base_url, folder, file_name),
            reference: format!("{}/{}", folder, file_name),
        })
    }

    async fn destroy(&self, reference: &str) -> Result<()> {
        if !is_safe_reference(reference) {
            return Err(ShelfError::validation("Invalid image reference"));
        }

        let path = self.base_path.join(reference);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShelfError::upstream(format!(
                "remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
