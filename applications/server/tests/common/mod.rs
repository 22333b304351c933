//! Common test utilities and fixtures
//!
//! Every test app gets its own file-backed SQLite database in a temp dir, so
//! all pooled connections share one schema.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use shelf_core::{Result as ShelfResult, ShelfError};
use shelf_server::{
    api::{router, RouterOptions},
    config::ServerConfig,
    services::{ImageStore, LocalImageStore, StoredImage},
    state::AppState,
};
use shelf_storage::SqliteStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key";

/// 1x1 transparent PNG
pub const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{}", PNG_B64)
}

/// Config tuned for tests: cheap bcrypt, short image timeout
pub fn test_config(dir: &TempDir) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.auth.bcrypt_cost = 4;
    config.images.timeout_secs = 1;
    config.images.local.path = dir.path().join("images");
    config.storage.database_url = format!("sqlite://{}", dir.path().join("test.db").display());
    config
}

/// Router plus the handles tests poke at directly
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<SqliteStore>,
    pub config: ServerConfig,
    pub dir: TempDir,
}

impl TestApp {
    /// App backed by the real local image store
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(&dir);
        let images = LocalImageStore::new(
            config.images.local.path.clone(),
            config.images.local.public_base_url.clone(),
        );
        images.initialize().await.expect("Failed to create image dir");
        Self::build(dir, config, Arc::new(images)).await
    }

    /// App backed by a caller-supplied image store
    pub async fn with_images(images: Arc<dyn ImageStore>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(&dir);
        Self::build(dir, config, images).await
    }

    async fn build(dir: TempDir, config: ServerConfig, images: Arc<dyn ImageStore>) -> Self {
        let store = Arc::new(
            SqliteStore::connect(&config.storage.database_url)
                .await
                .expect("Failed to open test database"),
        );
        let state = AppState::from_config(&config, Arc::clone(&store), images);
        let router = router(
            state.clone(),
            &RouterOptions {
                max_body_bytes: config.server.max_body_bytes,
                images_dir: Some(config.images.local.path.clone()),
            },
        );

        Self {
            router,
            state,
            store,
            config,
            dir,
        }
    }

    /// Send one request and return status plus JSON body (`Null` if empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Register through the API and return `(token, user id)`
    pub async fn register(&self, username: &str, email: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Create a book through the API and return its JSON
    pub async fn create_book(&self, token: &str, title: &str, rating: i64) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/books",
                Some(token),
                Some(serde_json::json!({
                    "title": title,
                    "caption": "A recommendation worth reading",
                    "rating": rating,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["book"].clone()
    }
}

/// Image store that remembers calls and can be told to fail
#[derive(Default)]
pub struct RecordingImageStore {
    pub uploads: Mutex<Vec<String>>,
    pub destroyed: Mutex<Vec<String>>,
    pub fail_upload: bool,
    pub fail_destroy: bool,
    /// Delay every call by this much (for timeout tests)
    pub delay: Option<Duration>,
}

pub const FAKE_IMAGE_HOST: &str = "https://images.test";

impl RecordingImageStore {
    pub fn failing_destroy() -> Self {
        Self {
            fail_destroy: true,
            ..Self::default()
        }
    }

    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn upload(&self, payload: &str, folder: &str) -> ShelfResult<StoredImage> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_upload {
            return Err(ShelfError::upstream("upload refused"));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(payload.to_string());
        let reference = format!("{}/img-{}", folder, uploads.len());
        Ok(StoredImage {
            url: format!("{}/{}.png", FAKE_IMAGE_HOST, reference),
            reference,
        })
    }

    async fn destroy(&self, reference: &str) -> ShelfResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.destroyed.lock().unwrap().push(reference.to_string());
        if self.fail_destroy {
            return Err(ShelfError::upstream("destroy refused"));
        }
        Ok(())
    }
}
