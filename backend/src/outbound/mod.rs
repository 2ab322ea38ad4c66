//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: in-process document store, used by default and in tests
//! - **firestore**: Firestore REST API document store
//!
//! Adapters are thin translators between domain records and the storage
//! representation. They contain no business logic.

pub mod firestore;
pub mod memory;
