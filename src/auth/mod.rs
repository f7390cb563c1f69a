//! Authentication Module
//! Mission: Password hashing, server-side sessions, and login gating

pub mod credentials;
pub mod middleware;
pub mod session;

pub use middleware::{require_login, CurrentUser};
pub use session::{cookie_key, removal_cookie, session_cookie, SessionStore, SESSION_COOKIE};
