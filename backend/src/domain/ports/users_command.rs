//! Driving port for mutating users.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, UserId};

/// Write-side user use-cases.
///
/// Each operation checks for the document first and then writes; the pair is
/// not atomic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Store a new user at `id`. Fails with `already_exists` if one is present.
    async fn create_user(&self, id: &UserId, data: NewUser) -> Result<(), Error>;

    /// Merge a freshly normalised user into the document at `id`.
    async fn update_user(&self, id: &UserId, data: NewUser) -> Result<(), Error>;

    /// Remove the user at `id`.
    async fn delete_user(&self, id: &UserId) -> Result<(), Error>;
}
