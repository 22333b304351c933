//! Field rules for users and books.
//!
//! Every write path funnels its input through these functions, so the
//! persisted records always satisfy the length, range and format limits
//! below.

use crate::error::{Result, ShelfError};
use crate::types::UpdateBook;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const PASSWORD_MIN: usize = 6;
pub const TITLE_MIN: usize = 2;
pub const TITLE_MAX: usize = 100;
pub const CAPTION_MIN: usize = 10;
pub const CAPTION_MAX: usize = 500;
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

/// Trim and length-check a username
pub fn username(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(ShelfError::validation(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim, lowercase and shape-check an email address.
///
/// Accepts `local@domain.tld` with no whitespace anywhere, exactly one `@`,
/// and a dot inside the domain with text on both sides.
pub fn email(raw: &str) -> Result<String> {
    let normalized = raw.trim().to_lowercase();
    if is_email_shaped(&normalized) {
        Ok(normalized)
    } else {
        Err(ShelfError::validation("Please enter a valid email address"))
    }
}

fn is_email_shaped(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Minimum-length check for a raw password
pub fn password(raw: &str) -> Result<()> {
    if raw.chars().count() < PASSWORD_MIN {
        return Err(ShelfError::validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN
        )));
    }
    Ok(())
}

/// Raw book fields as received from a client
#[derive(Debug, Clone, Default)]
pub struct BookInput {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub rating: Option<i64>,
}

impl BookInput {
    pub fn new(title: impl Into<String>, caption: impl Into<String>, rating: i64) -> Self {
        Self {
            title: Some(title.into()),
            caption: Some(caption.into()),
            rating: Some(rating),
        }
    }

    /// Require all three fields and check their limits
    pub fn validate(self) -> Result<UpdateBook> {
        let (Some(title), Some(caption), Some(rating)) = (self.title, self.caption, self.rating)
        else {
            return Err(missing_book_fields());
        };

        let title = title.trim();
        let caption = caption.trim();
        if title.is_empty() || caption.is_empty() {
            return Err(missing_book_fields());
        }

        let title_len = title.chars().count();
        if !(TITLE_MIN..=TITLE_MAX).contains(&title_len) {
            return Err(ShelfError::validation(format!(
                "Title must be between {} and {} characters",
                TITLE_MIN, TITLE_MAX
            )));
        }

        let caption_len = caption.chars().count();
        if !(CAPTION_MIN..=CAPTION_MAX).contains(&caption_len) {
            return Err(ShelfError::validation(format!(
                "Caption must be between {} and {} characters",
                CAPTION_MIN, CAPTION_MAX
            )));
        }

        if !(RATING_MIN..=RATING_MAX).contains(&rating) {
            return Err(ShelfError::validation(format!(
                "Rating must be between {} and {}",
                RATING_MIN, RATING_MAX
            )));
        }

        Ok(UpdateBook {
            title: title.to_string(),
            caption: caption.to_string(),
            rating: rating as u8,
        })
    }
}

fn missing_book_fields() -> ShelfError {
    ShelfError::validation("Title, caption, and rating are required")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed_and_bounded() {
        assert_eq!(username("  alice  ").unwrap(), "alice");
        assert!(username("al").is_err());
        assert!(username(&"a".repeat(31)).is_err());
        assert!(username(&"a".repeat(30)).is_ok());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(email("  Alice@X.com ").unwrap(), "alice@x.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["alice", "alice@", "@x.com", "alice@x", "a b@x.com", "a@b@c.com", "a@.com", "a@x."] {
            assert!(email(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(password("12345").is_err());
        assert!(password("secret1").is_ok());
    }

    #[test]
    fn valid_book_fields_pass_trimmed() {
        let fields = BookInput::new("  Dune ", " A desert epic saga ", 5)
            .validate()
            .unwrap();
        assert_eq!(fields.title, "Dune");
        assert_eq!(fields.caption, "A desert epic saga");
        assert_eq!(fields.rating, 5);
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let err = BookInput {
            title: Some("Dune".into()),
            caption: None,
            rating: Some(4),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Title, caption, and rating are required");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(BookInput::new("D", "A desert epic saga", 5).validate().is_err());
        assert!(BookInput::new("Dune", "too short", 5).validate().is_err());
        assert!(BookInput::new("Dune", "A desert epic saga", 6).validate().is_err());
        assert!(BookInput::new("Dune", "A desert epic saga", 0).validate().is_err());
        assert!(BookInput::new("Dune", &"x".repeat(501), 3).validate().is_err());
    }
}
