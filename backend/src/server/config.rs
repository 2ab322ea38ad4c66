//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use backend::config::{ServiceSettings, StoreBackend};
use backend::outbound::firestore::FirestoreConfig;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) mount_path: String,
    pub(crate) store: StoreBackend,
    pub(crate) firestore: Option<FirestoreConfig>,
}

impl ServerConfig {
    /// Construct a configuration serving `/users` from the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            mount_path: "/users".to_owned(),
            store: StoreBackend::Memory,
            firestore: None,
        }
    }

    /// Mount the users resource under `mount_path`.
    #[must_use]
    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = mount_path.into();
        self
    }

    /// Store users in Firestore instead of process memory.
    #[must_use]
    pub fn with_firestore(mut self, firestore: FirestoreConfig) -> Self {
        self.store = StoreBackend::Firestore;
        self.firestore = Some(firestore);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

impl From<ServiceSettings> for ServerConfig {
    fn from(settings: ServiceSettings) -> Self {
        let config = Self::new(settings.bind_addr).with_mount_path(settings.mount_path);
        match (settings.store, settings.firestore) {
            (StoreBackend::Firestore, Some(firestore)) => config.with_firestore(firestore),
            (store, firestore) => Self {
                store,
                firestore,
                ..config
            },
        }
    }
}
