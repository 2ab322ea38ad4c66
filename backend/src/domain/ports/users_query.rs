//! Driving port for reading users.
//!
//! Inbound adapters depend on this trait rather than on the store so handlers
//! stay testable without I/O.

use async_trait::async_trait;

use crate::domain::{Error, UserId, UserRecord};

/// Read-side user use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return the stored record for `id`, or a not-found error.
    async fn get_user(&self, id: &UserId) -> Result<UserRecord, Error>;

    /// Return every stored record, or a not-found error when there are none.
    async fn list_users(&self) -> Result<Vec<UserRecord>, Error>;
}
