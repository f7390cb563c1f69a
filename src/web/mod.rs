//! HTTP layer: application state, routes, page handlers and views.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod views;

pub use error::PageError;
pub use routes::router;
pub use views::Views;

use crate::auth::{cookie_key, SessionStore};
use crate::store::{CachedStore, Db};
use crate::tasks::TaskManager;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all request handlers. Constructed once by
/// the composition root; the cache lives inside [`CachedStore`] and has no
/// global fallback.
#[derive(Clone)]
pub struct AppState {
    pub store: CachedStore,
    pub tasks: TaskManager,
    pub sessions: SessionStore,
    pub views: Arc<Views>,
    pub cookie_key: Key,
    pub production: bool,
}

impl AppState {
    pub fn build(
        db: Db,
        session_secret: &str,
        production: bool,
        cache_ttl: Duration,
    ) -> anyhow::Result<Self> {
        let store = CachedStore::new(db.clone(), cache_ttl);
        Ok(Self {
            tasks: TaskManager::new(store.clone()),
            sessions: SessionStore::new(db),
            views: Arc::new(Views::new()?),
            cookie_key: cookie_key(session_secret),
            production,
            store,
        })
    }
}

// Lets SignedCookieJar pull its signing key out of the shared state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}
