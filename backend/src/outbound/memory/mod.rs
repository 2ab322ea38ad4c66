//! In-process document store.
//!
//! Holds user documents as JSON objects keyed by id. Documents are kept in id
//! order so listing is deterministic; documents that no longer decode as
//! user records are skipped when listing. `update` merges top-level fields into
//! the stored document, matching the document-store contract of the
//! [`UserStore`] port.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{UserId, UserRecord};

type Document = Map<String, Value>;

/// [`UserStore`] adapter backed by an in-memory map.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    documents: RwLock<BTreeMap<String, Document>>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn encode(record: &UserRecord) -> Result<Document, UserStoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(UserStoreError::serialization(format!(
            "user record encoded as non-object: {other}"
        ))),
        Err(err) => Err(UserStoreError::serialization(err.to_string())),
    }
}

fn decode(id: &str, document: &Document) -> Result<UserRecord, UserStoreError> {
    serde_json::from_value(Value::Object(document.clone())).map_err(|err| {
        UserStoreError::serialization(format!("document {id} is not a user record: {err}"))
    })
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn exists(&self, id: &UserId) -> Result<bool, UserStoreError> {
        Ok(self.documents.read().await.contains_key(id.as_str()))
    }

    async fn get(&self, id: &UserId) -> Result<Option<UserRecord>, UserStoreError> {
        let documents = self.documents.read().await;
        documents
            .get(id.as_str())
            .map(|document| decode(id.as_str(), document))
            .transpose()
    }

    async fn get_all(&self) -> Result<Vec<UserRecord>, UserStoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter_map(|(id, document)| match decode(id, document) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(error = %err, "skipping malformed user document");
                    None
                }
            })
            .collect())
    }

    async fn set(&self, id: &UserId, record: &UserRecord) -> Result<(), UserStoreError> {
        let document = encode(record)?;
        self.documents
            .write()
            .await
            .insert(id.as_str().to_owned(), document);
        Ok(())
    }

    async fn update(&self, id: &UserId, record: &UserRecord) -> Result<(), UserStoreError> {
        let fields = encode(record)?;
        let mut documents = self.documents.write().await;
        let Some(document) = documents.get_mut(id.as_str()) else {
            return Err(UserStoreError::query(format!("no document to update: {id}")));
        };
        document.extend(fields);
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserStoreError> {
        self.documents.write().await.remove(id.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests;
