/// Credential service - registration, login checks and profile updates
use crate::error::{Result, ServerError};
use crate::services::images::{destroy_with_timeout, upload_with_timeout, ImageStore};
use shelf_core::{
    storage::UserStore,
    types::{default_avatar, CreateUser, UpdateProfile, User, UserId},
    validation, ShelfError,
};
use std::sync::Arc;
use std::time::Duration;

/// Folder uploaded avatars go to
pub const PROFILE_IMAGE_FOLDER: &str = "profile-images";

pub struct CredentialService {
    users: Arc<dyn UserStore>,
    images: Arc<dyn ImageStore>,
    bcrypt_cost: u32,
    image_timeout: Duration,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserStore>,
        images: Arc<dyn ImageStore>,
        bcrypt_cost: u32,
        image_timeout: Duration,
    ) -> Self {
        Self {
            users,
            images,
            bcrypt_cost,
            image_timeout,
        }
    }

    /// Create an account with a hashed password and generated avatar
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let username = validation::username(username)?;
        let email = validation::email(email)?;
        validation::password(password)?;

        if self.users.get_user_by_email(&email).await?.is_some() {
            return Err(ShelfError::duplicate("Email").into());
        }
        if self.users.get_user_by_username(&username).await?.is_some() {
            return Err(ShelfError::duplicate("Username").into());
        }

        let password_hash = self.hash_password(password).await?;
        let profile_image = default_avatar(&username);

        // The UNIQUE constraints still catch a registration racing this one
        let user = self
            .users
            .create_user(CreateUser {
                username,
                email,
                password_hash,
                profile_image,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check an email/password pair.
    ///
    /// Unknown emails and wrong passwords fail identically.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();

        let Some(user) = self.users.get_user_by_email(&email).await? else {
            return Err(ShelfError::InvalidCredentials.into());
        };

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(ShelfError::InvalidCredentials.into());
        }

        Ok(user)
    }

    /// Look a user up by id; `None` if the account does not exist
    pub async fn find(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.users.get_user(id).await?)
    }

    pub async fn profile(&self, id: &UserId) -> Result<User> {
        self.find(id)
            .await?
            .ok_or_else(|| ShelfError::not_found("User", id.as_str()).into())
    }

    /// Change username and optionally the avatar URL.
    ///
    /// The username must not belong to any *other* user; keeping your own is fine.
    pub async fn update_profile(
        &self,
        id: &UserId,
        username: &str,
        profile_image: Option<&str>,
    ) -> Result<User> {
        let username = validation::username(username)?;

        if let Some(existing) = self.users.get_user_by_username(&username).await? {
            if existing.id != *id {
                return Err(ShelfError::duplicate("Username").into());
            }
        }

        let profile_image = profile_image
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        let user = self
            .users
            .update_profile(
                id,
                UpdateProfile {
                    username: Some(username),
                    profile_image,
                },
            )
            .await?;

        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Upload a new avatar and point the profile at it
    pub async fn update_profile_image(&self, id: &UserId, payload: &str) -> Result<User> {
        if payload.trim().is_empty() {
            return Err(ShelfError::validation("Image is required").into());
        }

        let stored = upload_with_timeout(
            self.images.as_ref(),
            payload,
            PROFILE_IMAGE_FOLDER,
            self.image_timeout,
        )
        .await?;

        let update = UpdateProfile {
            username: None,
            profile_image: Some(stored.url.clone()),
        };

        match self.users.update_profile(id, update).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Profile image updated");
                Ok(user)
            }
            Err(e) => {
                // Do not leave an orphaned upload behind
                if let Err(cleanup) =
                    destroy_with_timeout(self.images.as_ref(), &stored.reference, self.image_timeout)
                        .await
                {
                    tracing::warn!(reference = %stored.reference, "Failed to discard upload: {}", cleanup);
                }
                Err(e.into())
            }
        }
    }

    /// All accounts, ordered by username
    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.get_all_users().await?)
    }

    /// Hash a password using bcrypt off the async runtime
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ServerError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| ServerError::Internal(format!("verify task failed: {}", e)))?
            .map_err(ServerError::from)
    }
}
