//! User entity and its stored representation.
//!
//! [`User`] is built from a [`NewUser`] input record, applying the defaulting
//! rules once at construction. [`User::to_record`] flattens it into the
//! [`UserRecord`] persisted in the document store and returned over the wire.
//! Reading a record back goes through the same constructor, so stored
//! documents and fresh input are normalised identically.

use serde::{Deserialize, Serialize};

use crate::domain::{UserId, hash_email};

/// Linked GitHub account details.
///
/// The entity does not require both fields to be present; the request schema
/// enforces that. Absent fields are omitted from the serialised form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl GithubAccount {
    /// Build a fully populated account.
    pub fn new(username: impl Into<String>, avatar_url: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            avatar_url: Some(avatar_url.into()),
        }
    }
}

/// Input record accepted by [`User::new`].
///
/// Optional fields are defaulted during construction rather than here so the
/// same rules apply to request bodies and stored documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: Option<String>,
    pub is_admin: Option<bool>,
    pub is_flagged: Option<bool>,
    pub feeds: Vec<String>,
    pub github: Option<GithubAccount>,
}

/// Build the display name used when a user has not chosen one.
///
/// # Examples
/// ```
/// use backend::domain::default_display_name;
///
/// assert_eq!(default_display_name("Carl", "Sagan"), "Carl Sagan");
/// ```
pub fn default_display_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

/// Telescope user.
///
/// ## Invariants
/// - `display_name` is never empty after construction; it falls back to
///   `"{first_name} {last_name}"`.
/// - The identifier is derived from `email` and never stored on the entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    email: String,
    first_name: String,
    last_name: String,
    display_name: String,
    is_admin: bool,
    is_flagged: bool,
    feeds: Vec<String>,
    github: Option<GithubAccount>,
}

impl User {
    /// Construct a user, applying defaults for optional fields.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{NewUser, User};
    ///
    /// let user = User::new(NewUser {
    ///     email: "carl@email.com".into(),
    ///     first_name: "Carl".into(),
    ///     last_name: "Sagan".into(),
    ///     feeds: vec!["https://carl.blog.com/feed".into()],
    ///     ..NewUser::default()
    /// });
    /// assert_eq!(user.display_name(), "Carl Sagan");
    /// assert!(!user.is_admin());
    /// ```
    pub fn new(data: NewUser) -> Self {
        let NewUser {
            email,
            first_name,
            last_name,
            display_name,
            is_admin,
            is_flagged,
            feeds,
            github,
        } = data;

        let display_name = display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_display_name(&first_name, &last_name));

        Self {
            email,
            first_name,
            last_name,
            display_name,
            is_admin: is_admin == Some(true),
            is_flagged: is_flagged == Some(true),
            feeds,
            github,
        }
    }

    /// Document identifier derived from the email address.
    pub fn id(&self) -> UserId {
        hash_email(&self.email)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_flagged(&self) -> bool {
        self.is_flagged
    }

    /// Feed URLs in the order they were supplied.
    pub fn feeds(&self) -> &[String] {
        &self.feeds
    }

    pub fn github(&self) -> Option<&GithubAccount> {
        self.github.as_ref()
    }

    /// Flatten the user into its stored representation.
    pub fn to_record(&self) -> UserRecord {
        self.clone().into()
    }
}

/// Flat stored and wire representation of a [`User`].
///
/// `github` is omitted entirely when the user has no linked account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub is_admin: bool,
    pub is_flagged: bool,
    pub feeds: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubAccount>,
}

impl From<User> for UserRecord {
    fn from(value: User) -> Self {
        let User {
            email,
            first_name,
            last_name,
            display_name,
            is_admin,
            is_flagged,
            feeds,
            github,
        } = value;
        Self {
            email,
            first_name,
            last_name,
            display_name,
            is_admin,
            is_flagged,
            feeds,
            github,
        }
    }
}

impl From<UserRecord> for NewUser {
    fn from(value: UserRecord) -> Self {
        let UserRecord {
            email,
            first_name,
            last_name,
            display_name,
            is_admin,
            is_flagged,
            feeds,
            github,
        } = value;
        Self {
            email,
            first_name,
            last_name,
            display_name: Some(display_name),
            is_admin: Some(is_admin),
            is_flagged: Some(is_flagged),
            feeds,
            github,
        }
    }
}

impl From<UserRecord> for User {
    fn from(value: UserRecord) -> Self {
        Self::new(value.into())
    }
}
