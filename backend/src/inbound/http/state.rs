//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::UserSchema;
use crate::domain::ports::{UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users_query: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    /// Request schema, built once and shared read-only.
    pub schema: Arc<UserSchema>,
}

impl HttpState {
    /// Construct state from the users ports with a freshly built schema.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::UsersService;
    /// use backend::inbound::http::state::HttpState;
    /// use backend::outbound::memory::InMemoryUserStore;
    ///
    /// let service = Arc::new(UsersService::new(Arc::new(InMemoryUserStore::new())));
    /// let state = HttpState::new(service.clone(), service);
    /// let _schema = state.schema.clone();
    /// ```
    pub fn new(users_query: Arc<dyn UsersQuery>, users_command: Arc<dyn UsersCommand>) -> Self {
        Self {
            users_query,
            users_command,
            schema: Arc::new(UserSchema::new()),
        }
    }
}
