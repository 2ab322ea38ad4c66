//! Port for the document store holding user records.
//!
//! The store is addressed by document id within a single collection and does
//! not enforce any schema. Adapters own their consistency model; the domain
//! performs at most one existence check followed by one write per request and
//! accepts the race between the two.

use async_trait::async_trait;

use crate::domain::{UserId, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user store adapters.
    pub enum UserStoreError {
        /// The store could not be reached.
        Connection { message: String } => "user store connection failed: {message}",
        /// The store rejected or failed to execute the operation.
        Query { message: String } => "user store query failed: {message}",
        /// A stored document could not be converted to or from a record.
        Serialization { message: String } => "user store serialization failed: {message}",
    }
}

/// Document store operations used by the users service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Report whether a document exists at `id`.
    async fn exists(&self, id: &UserId) -> Result<bool, UserStoreError>;

    /// Fetch the document stored at `id`.
    async fn get(&self, id: &UserId) -> Result<Option<UserRecord>, UserStoreError>;

    /// Fetch every document in the collection, in store order.
    ///
    /// Documents that do not decode as user records are logged and skipped.
    async fn get_all(&self) -> Result<Vec<UserRecord>, UserStoreError>;

    /// Write `record` at `id`, replacing any existing document.
    async fn set(&self, id: &UserId, record: &UserRecord) -> Result<(), UserStoreError>;

    /// Merge the fields of `record` into the existing document at `id`.
    ///
    /// Fields absent from `record` keep their stored values.
    async fn update(&self, id: &UserId, record: &UserRecord) -> Result<(), UserStoreError>;

    /// Remove the document at `id`.
    async fn delete(&self, id: &UserId) -> Result<(), UserStoreError>;
}
