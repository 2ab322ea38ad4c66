//! Identity derivation for user documents.
//!
//! A user's storage key is not chosen by clients; it is the truncated SHA-256
//! digest of their email address. Two users with the same email therefore
//! address the same document, which is how duplicate creation is detected.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hexadecimal characters kept from the email digest.
pub const USER_ID_LEN: usize = 10;

/// Validation errors returned by [`UserId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdValidationError {
    #[error("user id must not be empty")]
    Empty,
    #[error("user id must be a hexadecimal string")]
    NotHex,
}

/// Opaque document identifier for a user.
///
/// Identifiers minted by [`hash_email`] are always [`USER_ID_LEN`] lowercase
/// hex characters. Identifiers parsed from request paths only need to be
/// non-empty hex so that lookups for foreign ids report "not found" rather
/// than "invalid".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate a raw identifier, typically a path segment.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::UserId;
    ///
    /// assert!(UserId::parse("a1b2c3").is_ok());
    /// assert!(UserId::parse("not-hex").is_err());
    /// ```
    pub fn parse(raw: impl Into<String>) -> Result<Self, UserIdValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(UserIdValidationError::Empty);
        }
        if !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(UserIdValidationError::NotHex);
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Derive the document identifier for `email`.
///
/// The email is hashed exactly as given; callers that want case-insensitive
/// identity must normalise before calling.
///
/// # Examples
/// ```
/// use backend::domain::hash_email;
///
/// let id = hash_email("carl@email.com");
/// assert_eq!(id, hash_email("carl@email.com"));
/// assert_eq!(id.as_str().len(), 10);
/// ```
pub fn hash_email(email: &str) -> UserId {
    let digest = Sha256::digest(email.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(USER_ID_LEN);
    UserId(encoded)
}
