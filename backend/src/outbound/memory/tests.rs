//! Tests for the in-memory user store.

use super::*;
use crate::domain::{GithubAccount, NewUser, User, hash_email};
use rstest::{fixture, rstest};

#[fixture]
fn carl() -> UserRecord {
    User::new(NewUser {
        email: "carl@email.com".to_owned(),
        first_name: "Carl".to_owned(),
        last_name: "Sagan".to_owned(),
        feeds: vec!["https://carl.blog.com/feed".to_owned()],
        github: Some(GithubAccount::new(
            "carlsagan",
            "https://avatars.githubusercontent.com/u/2",
        )),
        ..NewUser::default()
    })
    .to_record()
}

#[fixture]
fn store() -> InMemoryUserStore {
    InMemoryUserStore::new()
}

#[rstest]
#[tokio::test]
async fn set_then_get_returns_record(store: InMemoryUserStore, carl: UserRecord) {
    let id = hash_email(&carl.email);
    assert!(!store.exists(&id).await.expect("exists"));

    store.set(&id, &carl).await.expect("set");

    assert!(store.exists(&id).await.expect("exists"));
    assert_eq!(store.get(&id).await.expect("get"), Some(carl));
}

#[rstest]
#[tokio::test]
async fn get_missing_document_is_none(store: InMemoryUserStore) {
    let id = hash_email("nobody@email.com");
    assert_eq!(store.get(&id).await.expect("get"), None);
}

#[rstest]
#[tokio::test]
async fn update_keeps_fields_absent_from_record(store: InMemoryUserStore, carl: UserRecord) {
    let id = hash_email(&carl.email);
    store.set(&id, &carl).await.expect("set");

    let changed = UserRecord {
        first_name: "Carlos".to_owned(),
        github: None,
        ..carl.clone()
    };
    store.update(&id, &changed).await.expect("update");

    let stored = store.get(&id).await.expect("get").expect("document present");
    assert_eq!(stored.first_name, "Carlos");
    assert_eq!(stored.github, carl.github);
}

#[rstest]
#[tokio::test]
async fn update_missing_document_fails(store: InMemoryUserStore, carl: UserRecord) {
    let id = hash_email(&carl.email);
    let error = store.update(&id, &carl).await.expect_err("missing document");
    assert!(matches!(error, UserStoreError::Query { .. }));
    assert!(store.is_empty().await);
}

#[rstest]
#[tokio::test]
async fn delete_is_idempotent(store: InMemoryUserStore, carl: UserRecord) {
    let id = hash_email(&carl.email);
    store.set(&id, &carl).await.expect("set");

    store.delete(&id).await.expect("first delete");
    store.delete(&id).await.expect("second delete");

    assert!(!store.exists(&id).await.expect("exists"));
}

#[rstest]
#[tokio::test]
async fn get_all_orders_by_document_id(store: InMemoryUserStore, carl: UserRecord) {
    let galileo = UserRecord {
        email: "galileo@email.com".to_owned(),
        first_name: "Galileo".to_owned(),
        last_name: "Galilei".to_owned(),
        display_name: "Galileo Galilei".to_owned(),
        github: None,
        ..carl.clone()
    };
    let records = [carl, galileo];
    for record in &records {
        store
            .set(&hash_email(&record.email), record)
            .await
            .expect("set");
    }

    let mut expected: Vec<(UserId, UserRecord)> = records
        .into_iter()
        .map(|record| (hash_email(&record.email), record))
        .collect();
    expected.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));

    let listed = store.get_all().await.expect("get_all");
    assert_eq!(
        listed,
        expected.into_iter().map(|(_, record)| record).collect::<Vec<_>>()
    );
    assert_eq!(store.len().await, 2);
}

#[rstest]
#[tokio::test]
async fn get_all_skips_documents_that_are_not_user_records(
    store: InMemoryUserStore,
    carl: UserRecord,
) {
    store.set(&hash_email(&carl.email), &carl).await.expect("set");
    let mut stray = Document::new();
    stray.insert("email".to_owned(), Value::from("stray@email.com"));
    store.documents.write().await.insert("abc".to_owned(), stray);

    let listed = store.get_all().await.expect("get_all");

    assert_eq!(listed, vec![carl]);
    assert_eq!(store.len().await, 2);
}

#[rstest]
#[tokio::test]
async fn get_reports_malformed_document(store: InMemoryUserStore) {
    store
        .documents
        .write()
        .await
        .insert("abc".to_owned(), Document::new());

    let error = store
        .get(&UserId::parse("abc").expect("hex id"))
        .await
        .expect_err("malformed document");

    assert!(matches!(error, UserStoreError::Serialization { .. }));
}
