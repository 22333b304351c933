/// User domain types
use super::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base URL of the generated avatar service; the username is the seed.
pub const AVATAR_BASE_URL: &str = "https://api.dicebear.com/6.x/avataaars/svg";

/// User account as persisted, including the password hash.
///
/// Deliberately not `Serialize`: convert to [`PublicUser`] before anything
/// leaves the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Trimmed and lowercased
    pub email: String,
    /// bcrypt hash
    pub password_hash: String,
    pub profile_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The user without credential material
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            profile_image: self.profile_image.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User as exposed to clients and to request handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub profile_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            profile_image: user.profile_image,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Data for creating a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image: String,
}

/// Partial profile update. Carries no password field, so a profile
/// update can never re-hash or replace credentials.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub username: Option<String>,
    pub profile_image: Option<String>,
}

/// Default avatar URL for a username
pub fn default_avatar(username: &str) -> String {
    format!("{}?seed={}", AVATAR_BASE_URL, username)
}
