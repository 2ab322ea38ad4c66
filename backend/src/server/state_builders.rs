//! Builders for HTTP state backed by the configured user store.

use std::io;
use std::sync::Arc;

use tracing::info;

use backend::config::StoreBackend;
use backend::domain::UsersService;
use backend::domain::ports::UserStore;
use backend::inbound::http::state::HttpState;
use backend::outbound::firestore::FirestoreUserStore;
use backend::outbound::memory::InMemoryUserStore;

use super::ServerConfig;

fn state_for_store<S>(store: S) -> HttpState
where
    S: UserStore + 'static,
{
    let service = Arc::new(UsersService::new(Arc::new(store)));
    HttpState::new(service.clone(), service)
}

/// Build handler state for the store selected in `config`.
///
/// # Errors
/// Returns [`io::Error`] when the Firestore adapter cannot be constructed or
/// no Firestore settings were supplied for it.
pub(super) fn build_http_state(config: &ServerConfig) -> io::Result<HttpState> {
    match (config.store, &config.firestore) {
        (StoreBackend::Memory, _) => {
            info!(store = "memory", "using in-memory user store");
            Ok(state_for_store(InMemoryUserStore::new()))
        }
        (StoreBackend::Firestore, Some(firestore)) => {
            info!(
                store = "firestore",
                project = %firestore.project,
                collection = %firestore.collection,
                emulator = firestore.emulator_host.is_some(),
                "using Firestore user store"
            );
            let store = FirestoreUserStore::new(firestore.clone()).map_err(io::Error::other)?;
            Ok(state_for_store(store))
        }
        (StoreBackend::Firestore, None) => Err(io::Error::other(
            "firestore store selected without Firestore settings",
        )),
    }
}
