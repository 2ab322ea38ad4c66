//! Users domain service.
//!
//! Implements the driving ports on top of a [`UserStore`]. Inputs arrive
//! already validated; this layer owns existence checks, entity construction
//! and the mapping of storage failures onto domain errors.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::ports::{UserStore, UserStoreError, UsersCommand, UsersQuery};
use crate::domain::{Error, NewUser, TraceId, User, UserId, UserRecord};

/// Users service implementing [`UsersQuery`] and [`UsersCommand`].
#[derive(Clone)]
pub struct UsersService<S> {
    store: Arc<S>,
}

impl<S> UsersService<S> {
    /// Create a new service backed by `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn not_found(id: &UserId) -> Error {
    Error::not_found(format!("user {id} not found.")).with_details(json!({ "id": id }))
}

impl<S> UsersService<S>
where
    S: UserStore,
{
    fn map_store_error(operation: &'static str, id: Option<&UserId>, err: UserStoreError) -> Error {
        let trace_id = TraceId::current().map(|trace| trace.to_string());
        error!(
            operation,
            user_id = id.map(UserId::as_str),
            trace_id = trace_id.as_deref(),
            error = %err,
            "user store operation failed"
        );
        match err {
            UserStoreError::Connection { .. } => Error::service_unavailable("user store unavailable"),
            UserStoreError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
            UserStoreError::Serialization { message } => {
                Error::internal(format!("user store serialization failed: {message}"))
            }
        }
    }

    async fn ensure_exists(&self, operation: &'static str, id: &UserId) -> Result<(), Error> {
        let exists = self
            .store
            .exists(id)
            .await
            .map_err(|err| Self::map_store_error(operation, Some(id), err))?;
        if exists {
            Ok(())
        } else {
            debug!(operation, user_id = %id, "user not found");
            Err(not_found(id))
        }
    }
}

#[async_trait]
impl<S> UsersQuery for UsersService<S>
where
    S: UserStore,
{
    async fn get_user(&self, id: &UserId) -> Result<UserRecord, Error> {
        let record = self
            .store
            .get(id)
            .await
            .map_err(|err| Self::map_store_error("get", Some(id), err))?;
        match record {
            Some(record) => Ok(User::from(record).to_record()),
            None => {
                debug!(user_id = %id, "user not found");
                Err(not_found(id))
            }
        }
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, Error> {
        let records = self
            .store
            .get_all()
            .await
            .map_err(|err| Self::map_store_error("list", None, err))?;
        if records.is_empty() {
            debug!("user collection is empty");
            return Err(Error::not_found("no users found."));
        }
        Ok(records
            .into_iter()
            .map(|record| User::from(record).to_record())
            .collect())
    }
}

#[async_trait]
impl<S> UsersCommand for UsersService<S>
where
    S: UserStore,
{
    async fn create_user(&self, id: &UserId, data: NewUser) -> Result<(), Error> {
        let exists = self
            .store
            .exists(id)
            .await
            .map_err(|err| Self::map_store_error("create", Some(id), err))?;
        if exists {
            debug!(user_id = %id, "user already exists");
            return Err(
                Error::already_exists(format!("User with id {id} already exists."))
                    .with_details(json!({ "id": id })),
            );
        }

        let record = User::new(data).to_record();
        self.store
            .set(id, &record)
            .await
            .map_err(|err| Self::map_store_error("create", Some(id), err))?;
        info!(user_id = %id, "user created");
        Ok(())
    }

    async fn update_user(&self, id: &UserId, data: NewUser) -> Result<(), Error> {
        self.ensure_exists("update", id).await?;

        let record = User::new(data).to_record();
        self.store
            .update(id, &record)
            .await
            .map_err(|err| Self::map_store_error("update", Some(id), err))?;
        info!(user_id = %id, "user updated");
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        self.ensure_exists("delete", id).await?;

        self.store
            .delete(id)
            .await
            .map_err(|err| Self::map_store_error("delete", Some(id), err))?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "users_service_tests.rs"]
mod tests;
