//! Session Authenticator
//! Mission: Map opaque session ids to user identities, store-backed
//!
//! The browser holds only a signed, httpOnly cookie with a UUID session id;
//! the server-side record carries the authenticated user's id and an absolute
//! expiry two hours from the last write. Reads do not extend the lifetime.
//! Logout fully deletes the server-side record, not merely the cookie.

use crate::store::db::{Db, SessionRecord, StoreError};
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use chrono::Utc;
use sha2::{Digest, Sha512};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "taskflow_sid";

const SESSION_TTL_SECS: i64 = 2 * 60 * 60;

/// Store-backed session records.
#[derive(Clone)]
pub struct SessionStore {
    db: Db,
}

impl SessionStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a session for a freshly authenticated user and return its id.
    pub async fn create(&self, user_id: i64) -> Result<String, StoreError> {
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: Utc::now().timestamp() + SESSION_TTL_SECS,
        };
        self.db.insert_session(&record).await?;
        Ok(record.id)
    }

    /// Resolve a session id to the authenticated user's id. Expired records
    /// are deleted on sight and reported as anonymous.
    pub async fn resolve(&self, id: &str) -> Result<Option<i64>, StoreError> {
        let Some(record) = self.db.get_session(id).await? else {
            return Ok(None);
        };
        if record.expires_at <= Utc::now().timestamp() {
            self.db.delete_session(id).await?;
            return Ok(None);
        }
        Ok(Some(record.user_id))
    }

    /// Destroy the server-side record. Idempotent.
    pub async fn destroy(&self, id: &str) -> Result<(), StoreError> {
        self.db.delete_session(id).await
    }
}

/// Cookie signing key derived from the configured session secret.
pub fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Session cookie: httpOnly, secure in production, 2-hour max age.
pub fn session_cookie(session_id: &str, production: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(production);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::seconds(SESSION_TTL_SECS));
    cookie
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn open_sessions() -> (SessionStore, Db, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db = Db::open(temp_file.path().to_str().unwrap()).unwrap();
        (SessionStore::new(db.clone()), db, temp_file)
    }

    #[tokio::test]
    async fn test_create_resolve_destroy() {
        let (sessions, _db, _temp) = open_sessions();

        let sid = sessions.create(42).await.unwrap();
        assert_eq!(sessions.resolve(&sid).await.unwrap(), Some(42));

        sessions.destroy(&sid).await.unwrap();
        assert_eq!(sessions.resolve(&sid).await.unwrap(), None);

        // Destroy is idempotent.
        sessions.destroy(&sid).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_session_is_anonymous() {
        let (sessions, _db, _temp) = open_sessions();
        assert_eq!(sessions.resolve("no-such-session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_is_deleted_on_resolve() {
        let (sessions, db, _temp) = open_sessions();
        let record = SessionRecord {
            id: "expired".to_string(),
            user_id: 42,
            expires_at: Utc::now().timestamp() - 10,
        };
        db.insert_session(&record).await.unwrap();

        assert_eq!(sessions.resolve("expired").await.unwrap(), None);
        // The record was fully removed, not just skipped.
        assert!(db.get_session("expired").await.unwrap().is_none());
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("abc", true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(SESSION_TTL_SECS))
        );

        let dev_cookie = session_cookie("abc", false);
        assert_eq!(dev_cookie.secure(), Some(false));
    }

    #[test]
    fn test_cookie_key_is_deterministic() {
        let a = cookie_key("secret-one");
        let b = cookie_key("secret-one");
        let c = cookie_key("secret-two");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
