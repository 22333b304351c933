//! Cloudinary-backed image store.
//!
//! Uploads go through the signed REST upload API. Signatures are SHA-256
//! over the alphabetically sorted parameters followed by the API secret.
//! Avatars are cropped to a 300x300 square on the way in.

use super::credentials::PROFILE_IMAGE_FOLDER;
use super::images::{ImagePayload, ImageStore, StoredImage};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use shelf_core::{Result, ShelfError};
use tracing::{debug, info};

/// Incoming transformation applied to uploaded avatars
const AVATAR_TRANSFORMATION: &str = "c_fill,h_300,w_300";

/// Upload-time transformation for a folder, if any
fn transformation_for(folder: &str) -> Option<&'static str> {
    (folder == PROFILE_IMAGE_FOLDER).then_some(AVATAR_TRANSFORMATION)
}

#[derive(Debug, Clone)]
pub struct CloudinaryImageStore {
    http: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryImageStore {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_base_url, self.cloud_name, action)
    }

    /// Hex SHA-256 of `k1=v1&k2=v2...<secret>` with keys sorted
    fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<_> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let joined = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Signed form body: the signed params plus key, signature and algorithm
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        let signature = self.sign(&params);
        params.push(("api_key", self.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        form: &[(&'static str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .post(self.endpoint(action))
            .form(form)
            .send()
            .await
            .map_err(|e| ShelfError::upstream(format!("cloudinary {}: {}", action, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShelfError::upstream(format!(
                "cloudinary {} returned {}: {}",
                action, status, body
            )));
        }

        response.json::<T>().await.map_err(|e| {
            ShelfError::upstream(format!("cloudinary {} response: {}", action, e))
        })
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(&self, payload: &str, folder: &str) -> Result<StoredImage> {
        let image = ImagePayload::parse(payload)?;
        let timestamp = Utc::now().timestamp().to_string();

        let mut params = vec![("folder", folder.to_string()), ("timestamp", timestamp)];
        if let Some(transformation) = transformation_for(folder) {
            params.push(("transformation", transformation.to_string()));
        }

        let mut form = self.signed_form(params);
        // `file` is not part of the signature
        form.push(("file", image.to_data_uri()));

        debug!(folder, bytes = image.bytes.len(), "Uploading image to Cloudinary");
        let uploaded: UploadResponse = self.post_form("upload", &form).await?;
        info!(public_id = %uploaded.public_id, "Image uploaded to Cloudinary");

        Ok(StoredImage {
            url: uploaded.secure_url,
            reference: uploaded.public_id,
        })
    }

    async fn destroy(&self, reference: &str) -> Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let form = self.signed_form(vec![
            ("public_id", reference.to_string()),
            ("timestamp", timestamp),
        ]);

        let destroyed: DestroyResponse = self.post_form("destroy", &form).await?;
        match destroyed.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(ShelfError::upstream(format!(
                "cloudinary destroy of {}: {}",
                reference, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CloudinaryImageStore {
        CloudinaryImageStore::new("demo", "key", "secret", "https://api.cloudinary.com/v1_1")
    }

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"folder=books&timestamp=1700000000secret");
            hex::encode(hasher.finalize())
        };

        let signature = store().sign(&[
            ("timestamp", "1700000000".to_string()),
            ("folder", "books".to_string()),
        ]);
        assert_eq!(signature, expected);
    }

    #[test]
    fn only_avatars_are_transformed() {
        assert_eq!(
            transformation_for(PROFILE_IMAGE_FOLDER),
            Some("c_fill,h_300,w_300")
        );
        assert_eq!(transformation_for("books"), None);
    }

    #[test]
    fn transformation_is_part_of_the_signature() {
        let plain = store().sign(&[
            ("folder", "profile-images".to_string()),
            ("timestamp", "1700000000".to_string()),
        ]);
        let cropped = store().sign(&[
            ("folder", "profile-images".to_string()),
            ("timestamp", "1700000000".to_string()),
            ("transformation", AVATAR_TRANSFORMATION.to_string()),
        ]);
        assert_ne!(plain, cropped);
    }
}
