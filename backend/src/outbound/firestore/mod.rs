//! Firestore outbound adapter.
//!
//! Implements the [`crate::domain::ports::UserStore`] port over the Firestore
//! REST API, against either Google Cloud or a local emulator.

mod dto;
mod http_store;
pub mod value;

pub use http_store::{FirestoreConfig, FirestoreSetupError, FirestoreUserStore};
