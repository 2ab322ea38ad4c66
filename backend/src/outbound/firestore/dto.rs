//! DTOs for Firestore REST documents.
//!
//! Documents are decoded into these transport shapes first, then their typed
//! `fields` are flattened into [`UserRecord`] values in one pass.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::value::{decode_fields, encode_fields};
use crate::domain::UserRecord;
use crate::domain::ports::UserStoreError;

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct DocumentDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) fields: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListDocumentsDto {
    #[serde(default)]
    pub(super) documents: Vec<DocumentDto>,
    #[serde(default)]
    pub(super) next_page_token: Option<String>,
}

impl DocumentDto {
    /// Encode a record as a document body, returning it with its field names.
    pub(super) fn from_record(record: &UserRecord) -> Result<(Self, Vec<String>), UserStoreError> {
        let Value::Object(plain) = serde_json::to_value(record)
            .map_err(|err| UserStoreError::serialization(err.to_string()))?
        else {
            return Err(UserStoreError::serialization(
                "user record encoded as non-object",
            ));
        };
        let field_paths = plain.keys().cloned().collect();
        let document = Self {
            name: None,
            fields: encode_fields(&plain),
        };
        Ok((document, field_paths))
    }

    pub(super) fn into_record(self) -> Result<UserRecord, UserStoreError> {
        let plain = decode_fields(&self.fields)?;
        serde_json::from_value(Value::Object(plain)).map_err(|err| {
            let name = self.name.as_deref().unwrap_or("<unnamed>");
            UserStoreError::serialization(format!("document {name} is not a user record: {err}"))
        })
    }
}

impl ListDocumentsDto {
    /// Decode one page into records plus the token of the next page.
    ///
    /// Documents that are not user records are logged and skipped so one bad
    /// document does not fail the whole listing.
    pub(super) fn into_records(self) -> (Vec<UserRecord>, Option<String>) {
        let records = self
            .documents
            .into_iter()
            .filter_map(|document| match document.into_record() {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(error = %err, "skipping malformed user document");
                    None
                }
            })
            .collect();
        let next_page_token = self.next_page_token.filter(|token| !token.is_empty());
        (records, next_page_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GithubAccount, NewUser, User};
    use rstest::rstest;
    use serde_json::json;

    fn carl(github: Option<GithubAccount>) -> UserRecord {
        User::new(NewUser {
            email: "carl@email.com".to_owned(),
            first_name: "Carl".to_owned(),
            last_name: "Sagan".to_owned(),
            feeds: vec!["https://carl.blog.com/feed".to_owned()],
            github,
            ..NewUser::default()
        })
        .to_record()
    }

    #[rstest]
    fn field_paths_skip_absent_github() {
        let (_, paths) = DocumentDto::from_record(&carl(None)).expect("encode");
        assert!(!paths.iter().any(|path| path == "github"));
        assert!(paths.iter().any(|path| path == "displayName"));
    }

    #[rstest]
    fn record_survives_document_round_trip() {
        let record = carl(Some(GithubAccount::new("carlsagan", "https://x.example/a")));
        let (document, _) = DocumentDto::from_record(&record).expect("encode");
        assert_eq!(document.into_record().expect("decode"), record);
    }

    #[rstest]
    fn list_response_tolerates_empty_collection() {
        let listed: ListDocumentsDto = serde_json::from_value(json!({})).expect("decode");
        assert!(listed.documents.is_empty());
        assert!(listed.next_page_token.is_none());
    }

    #[rstest]
    fn document_missing_required_field_is_serialization_error() {
        let document: DocumentDto = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/users/abc",
            "fields": { "email": { "stringValue": "carl@email.com" } },
        }))
        .expect("decode dto");
        let error = document.into_record().expect_err("incomplete record");
        assert!(matches!(error, UserStoreError::Serialization { .. }));
        assert!(error.to_string().contains("users/abc"));
    }

    #[rstest]
    fn list_page_skips_malformed_documents() {
        let (good, _) = DocumentDto::from_record(&carl(None)).expect("encode");
        let page: ListDocumentsDto = serde_json::from_value(json!({
            "documents": [
                { "name": "projects/p/databases/(default)/documents/users/7e81b3a737", "fields": good.fields },
                { "name": "projects/p/databases/(default)/documents/users/abc", "fields": { "email": { "stringValue": "x" } } },
            ],
            "nextPageToken": "page-2",
        }))
        .expect("decode page");

        let (records, next) = page.into_records();

        assert_eq!(records, vec![carl(None)]);
        assert_eq!(next.as_deref(), Some("page-2"));
    }

    #[rstest]
    fn empty_page_token_ends_listing() {
        let page: ListDocumentsDto =
            serde_json::from_value(json!({ "nextPageToken": "" })).expect("decode page");
        let (records, next) = page.into_records();
        assert!(records.is_empty());
        assert!(next.is_none());
    }
}
