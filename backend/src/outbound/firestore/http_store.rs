//! Reqwest-backed Firestore user store.
//!
//! This adapter owns transport details only: document URLs, bearer auth,
//! timeout and HTTP error mapping, and typed-value encoding of records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::dto::{DocumentDto, ListDocumentsDto};
use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{UserId, UserRecord};

const CLOUD_ORIGIN: &str = "https://firestore.googleapis.com";
const EMULATOR_TOKEN: &str = "owner";
const LIST_PAGE_SIZE: u32 = 300;

/// Connection settings for [`FirestoreUserStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    /// Google Cloud project holding the database.
    pub project: String,
    /// Collection the user documents live in.
    pub collection: String,
    /// `host:port` of a local emulator. Takes precedence over Cloud.
    pub emulator_host: Option<String>,
    /// OAuth bearer token for Cloud requests.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Errors raised while constructing a [`FirestoreUserStore`].
#[derive(Debug, thiserror::Error)]
pub enum FirestoreSetupError {
    /// The project, collection or emulator host do not form a valid URL.
    #[error("invalid Firestore endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    /// The HTTP client could not be built.
    #[error("failed to build Firestore HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Firestore adapter addressing one collection.
pub struct FirestoreUserStore {
    client: Client,
    collection_url: Url,
    token: Option<String>,
}

impl FirestoreUserStore {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let store = FirestoreUserStore::new(config)?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the endpoint URL is invalid or the reqwest client
    /// cannot be constructed.
    pub fn new(config: FirestoreConfig) -> Result<Self, FirestoreSetupError> {
        let (origin, token) = match config.emulator_host {
            Some(host) => (format!("http://{host}"), Some(EMULATOR_TOKEN.to_owned())),
            None => (CLOUD_ORIGIN.to_owned(), config.token),
        };
        let collection_url = collection_url(&origin, &config.project, &config.collection)?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            collection_url,
            token,
        })
    }

    fn document_url(&self, id: &UserId) -> Url {
        let mut url = self.collection_url.clone();
        // `collection_url` is validated as a base URL at construction.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id.as_str());
        }
        url
    }

    /// Merge-write URL: masks the write to `field_paths` and requires the
    /// document to exist.
    fn update_url(&self, id: &UserId, field_paths: &[String]) -> Url {
        let mut url = self.document_url(id);
        {
            let mut query = url.query_pairs_mut();
            for path in field_paths {
                query.append_pair("updateMask.fieldPaths", path);
            }
            query.append_pair("currentDocument.exists", "true");
        }
        url
    }

    /// Collection listing URL for the page after `page_token`.
    fn list_url(&self, page_token: Option<&str>) -> Url {
        let mut url = self.collection_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", &LIST_PAGE_SIZE.to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        url
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, UserStoreError> {
        self.authorised(request)
            .send()
            .await
            .map_err(map_transport_error)
    }

    async fn fetch_document(&self, id: &UserId) -> Result<Option<DocumentDto>, UserStoreError> {
        let response = self.send(self.client.get(self.document_url(id))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode_success(response).await.map(Some)
    }

    async fn write_document(&self, url: Url, record: &UserRecord) -> Result<(), UserStoreError> {
        let (document, _) = DocumentDto::from_record(record)?;
        let response = self.send(self.client.patch(url).json(&document)).await?;
        ensure_success(response).await
    }
}

fn collection_url(
    origin: &str,
    project: &str,
    collection: &str,
) -> Result<Url, FirestoreSetupError> {
    let invalid = |reason: String| FirestoreSetupError::InvalidEndpoint {
        endpoint: origin.to_owned(),
        reason,
    };
    if project.trim().is_empty() || collection.trim().is_empty() {
        return Err(invalid("project and collection must not be empty".to_owned()));
    }
    let mut url = Url::parse(origin).map_err(|err| invalid(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("origin cannot carry a path".to_owned()))?
        .clear()
        .extend([
            "v1",
            "projects",
            project,
            "databases",
            "(default)",
            "documents",
            collection,
        ]);
    Ok(url)
}

#[async_trait]
impl UserStore for FirestoreUserStore {
    async fn exists(&self, id: &UserId) -> Result<bool, UserStoreError> {
        Ok(self.fetch_document(id).await?.is_some())
    }

    async fn get(&self, id: &UserId) -> Result<Option<UserRecord>, UserStoreError> {
        self.fetch_document(id)
            .await?
            .map(DocumentDto::into_record)
            .transpose()
    }

    async fn get_all(&self) -> Result<Vec<UserRecord>, UserStoreError> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = self.list_url(page_token.as_deref());
            let response = self.send(self.client.get(url)).await?;
            let page: ListDocumentsDto = decode_success(response).await?;
            let (page_records, next_page_token) = page.into_records();
            records.extend(page_records);
            match next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(records),
            }
        }
    }

    async fn set(&self, id: &UserId, record: &UserRecord) -> Result<(), UserStoreError> {
        self.write_document(self.document_url(id), record).await
    }

    async fn update(&self, id: &UserId, record: &UserRecord) -> Result<(), UserStoreError> {
        let (_, field_paths) = DocumentDto::from_record(record)?;
        self.write_document(self.update_url(id, &field_paths), record)
            .await
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserStoreError> {
        let response = self.send(self.client.delete(self.document_url(id))).await?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: Response) -> Result<(), UserStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.bytes().await.map_err(map_transport_error)?;
    Err(map_status_error(status, body.as_ref()))
}

async fn decode_success<T: DeserializeOwned>(response: Response) -> Result<T, UserStoreError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    serde_json::from_slice(body.as_ref()).map_err(|error| {
        UserStoreError::serialization(format!("invalid Firestore JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> UserStoreError {
    if error.is_connect() || error.is_timeout() {
        UserStoreError::connection(error.to_string())
    } else {
        UserStoreError::query(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> UserStoreError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT
        | StatusCode::REQUEST_TIMEOUT => UserStoreError::connection(message),
        _ => UserStoreError::query(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network URL and error mapping helpers.

    use super::*;
    use crate::domain::hash_email;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> FirestoreConfig {
        FirestoreConfig {
            project: "telescope".to_owned(),
            collection: "users".to_owned(),
            emulator_host: None,
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    #[rstest]
    fn cloud_urls_address_the_collection(config: FirestoreConfig) {
        let store = FirestoreUserStore::new(config).expect("store builds");
        let id = hash_email("carl@email.com");
        assert_eq!(
            store.document_url(&id).as_str(),
            format!(
                "https://firestore.googleapis.com/v1/projects/telescope/databases/(default)/documents/users/{id}"
            )
        );
        assert!(store.token.is_none());
    }

    #[rstest]
    fn emulator_host_switches_origin_and_token(config: FirestoreConfig) {
        let store = FirestoreUserStore::new(FirestoreConfig {
            emulator_host: Some("localhost:8088".to_owned()),
            token: Some("ignored".to_owned()),
            ..config
        })
        .expect("store builds");
        assert!(
            store
                .collection_url
                .as_str()
                .starts_with("http://localhost:8088/v1/projects/telescope/")
        );
        assert_eq!(store.token.as_deref(), Some(EMULATOR_TOKEN));
    }

    #[rstest]
    fn cloud_token_is_kept(config: FirestoreConfig) {
        let store = FirestoreUserStore::new(FirestoreConfig {
            token: Some("ya29.token".to_owned()),
            ..config
        })
        .expect("store builds");
        assert_eq!(store.token.as_deref(), Some("ya29.token"));
    }

    #[fixture]
    fn store(config: FirestoreConfig) -> FirestoreUserStore {
        FirestoreUserStore::new(config).expect("store builds")
    }

    fn query_of(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    #[rstest]
    fn update_url_masks_every_field_and_requires_existing_document(store: FirestoreUserStore) {
        let id = hash_email("carl@email.com");
        let fields = ["email", "firstName", "github"].map(str::to_owned);

        let url = store.update_url(&id, &fields);

        assert_eq!(url.path(), store.document_url(&id).path());
        assert_eq!(
            query_of(&url),
            vec![
                ("updateMask.fieldPaths".to_owned(), "email".to_owned()),
                ("updateMask.fieldPaths".to_owned(), "firstName".to_owned()),
                ("updateMask.fieldPaths".to_owned(), "github".to_owned()),
                ("currentDocument.exists".to_owned(), "true".to_owned()),
            ]
        );
    }

    #[rstest]
    #[case::first_page(None, vec![("pageSize", "300")])]
    #[case::next_page(Some("AFTER+carl/1"), vec![("pageSize", "300"), ("pageToken", "AFTER+carl/1")])]
    fn list_url_pages_through_the_collection(
        store: FirestoreUserStore,
        #[case] page_token: Option<&str>,
        #[case] expected: Vec<(&str, &str)>,
    ) {
        let url = store.list_url(page_token);

        assert_eq!(url.path(), store.collection_url.path());
        let expected: Vec<(String, String)> = expected
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();
        assert_eq!(query_of(&url), expected);
    }

    #[rstest]
    #[case("", "users")]
    #[case("telescope", " ")]
    fn rejects_blank_project_or_collection(
        config: FirestoreConfig,
        #[case] project: &str,
        #[case] collection: &str,
    ) {
        let result = FirestoreUserStore::new(FirestoreConfig {
            project: project.to_owned(),
            collection: collection.to_owned(),
            ..config
        });
        assert!(matches!(
            result,
            Err(FirestoreSetupError::InvalidEndpoint { .. })
        ));
    }

    #[rstest]
    #[case::unavailable(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case::not_found(StatusCode::NOT_FOUND, false)]
    #[case::forbidden(StatusCode::FORBIDDEN, false)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn maps_http_statuses_to_store_errors(#[case] status: StatusCode, #[case] connection: bool) {
        let error = map_status_error(status, b"{\"error\": {\"status\": \"NOT_FOUND\"}}");
        assert_eq!(
            matches!(error, UserStoreError::Connection { .. }),
            connection,
            "unexpected mapping for {status}"
        );
        assert!(error.to_string().contains(&status.as_u16().to_string()));
    }

    #[test]
    fn body_preview_truncates_long_payloads() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }
}
