//! Service-layer tests
//!
//! Drive `BookService` and `CredentialService` directly, below the HTTP layer,
//! to check outcomes the responses do not expose.
mod common;

use common::*;
use shelf_core::{validation::BookInput, ShelfError, UserId};
use shelf_server::services::ImageCleanup;
use shelf_server::ServerError;
use std::sync::Arc;
use std::time::Duration;

async fn user_id(app: &TestApp, username: &str) -> UserId {
    let (_, id) = app
        .register(username, &format!("{}@example.com", username), "secret1")
        .await;
    UserId::new(id)
}

fn dune() -> BookInput {
    BookInput::new("Dune", "A desert epic saga", 5)
}

// =============================================================================
// Book deletion and image cleanup
// =============================================================================

mod image_cleanup {
    use super::*;

    #[tokio::test]
    async fn test_uploaded_cover_is_removed() {
        let images = Arc::new(RecordingImageStore::default());
        let app = TestApp::with_images(images.clone()).await;
        let owner = user_id(&app, "alice").await;

        let book = app
            .state
            .books
            .create(&owner, dune(), Some(&png_data_uri()))
            .await
            .unwrap();
        let deleted = app.state.books.delete(&book.id, &owner).await.unwrap();

        assert_eq!(deleted.image_cleanup, ImageCleanup::Removed);
        assert_eq!(images.destroyed(), vec!["books/img-1".to_string()]);
    }

    #[tokio::test]
    async fn test_default_cover_is_skipped() {
        let app = TestApp::with_images(Arc::new(RecordingImageStore::default())).await;
        let owner = user_id(&app, "alice").await;

        let book = app.state.books.create(&owner, dune(), None).await.unwrap();
        let deleted = app.state.books.delete(&book.id, &owner).await.unwrap();

        assert_eq!(deleted.image_cleanup, ImageCleanup::Skipped);
    }

    #[tokio::test]
    async fn test_failed_destroy_is_reported_not_raised() {
        let app = TestApp::with_images(Arc::new(RecordingImageStore::failing_destroy())).await;
        let owner = user_id(&app, "alice").await;

        let book = app
            .state
            .books
            .create(&owner, dune(), Some(&png_data_uri()))
            .await
            .unwrap();
        let deleted = app.state.books.delete(&book.id, &owner).await.unwrap();

        assert!(matches!(deleted.image_cleanup, ImageCleanup::Failed(_)));
        assert!(app.state.books.get(&book.id).await.is_err());
    }

    #[tokio::test]
    async fn test_slow_destroy_times_out_after_delete() {
        let images = Arc::new(RecordingImageStore::default());
        let app = TestApp::with_images(images.clone()).await;
        let owner = user_id(&app, "alice").await;

        let book = app
            .state
            .books
            .create(&owner, dune(), Some(&png_data_uri()))
            .await
            .unwrap();

        // Fresh service over the same rows whose store hangs past the timeout
        let slow = Arc::new(RecordingImageStore::slow(Duration::from_secs(5)));
        let books = shelf_server::BookService::new(
            app.store.clone(),
            slow,
            shelf_core::types::DEFAULT_BOOK_IMAGE,
            100,
            Duration::from_secs(1),
        );

        let deleted = books.delete(&book.id, &owner).await.unwrap();
        assert!(matches!(deleted.image_cleanup, ImageCleanup::Failed(_)));
    }
}

// =============================================================================
// Ownership
// =============================================================================

mod ownership {
    use super::*;

    #[tokio::test]
    async fn test_non_owner_gets_forbidden_and_missing_gets_not_found() {
        let app = TestApp::new().await;
        let alice = user_id(&app, "alice").await;
        let bob = user_id(&app, "bob").await;

        let book = app.state.books.create(&alice, dune(), None).await.unwrap();

        let err = app.state.books.delete(&book.id, &bob).await.unwrap_err();
        assert!(matches!(err, ServerError::Domain(ShelfError::Forbidden(_))));

        let err = app
            .state
            .books
            .update(&shelf_core::BookId::new("missing"), &alice, dune())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Domain(ShelfError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_owner_delete_is_only_once() {
        let app = TestApp::new().await;
        let alice = user_id(&app, "alice").await;
        let book = app.state.books.create(&alice, dune(), None).await.unwrap();

        app.state.books.delete(&book.id, &alice).await.unwrap();
        let err = app.state.books.delete(&book.id, &alice).await.unwrap_err();
        assert!(matches!(err, ServerError::Domain(ShelfError::NotFound { .. })));
    }
}

// =============================================================================
// Credentials
// =============================================================================

mod credentials {
    use super::*;

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let app = TestApp::new().await;
        let user = app
            .state
            .credentials
            .register("alice", "alice@example.com", "secret1")
            .await
            .unwrap();

        assert_ne!(user.password_hash, "secret1");
        assert!(user.password_hash.starts_with("$2"));
        assert!(app
            .state
            .credentials
            .verify_password("secret1", &user.password_hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_fail_alike() {
        let app = TestApp::new().await;
        app.state
            .credentials
            .register("alice", "alice@example.com", "secret1")
            .await
            .unwrap();

        let wrong = app
            .state
            .credentials
            .verify_credentials("alice@example.com", "nope-nope")
            .await
            .unwrap_err();
        let unknown = app
            .state
            .credentials
            .verify_credentials("ghost@example.com", "secret1")
            .await
            .unwrap_err();

        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(
            wrong,
            ServerError::Domain(ShelfError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_failed_profile_update_discards_upload() {
        let images = Arc::new(RecordingImageStore::default());
        let app = TestApp::with_images(images.clone()).await;

        // No such user: the upload succeeds, the update does not
        let err = app
            .state
            .credentials
            .update_profile_image(&UserId::new("ghost"), &png_data_uri())
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::Domain(ShelfError::NotFound { .. })));
        assert_eq!(images.upload_count(), 1);
        assert_eq!(images.destroyed(), vec!["profile-images/img-1".to_string()]);
    }
}
