//! Authentication Middleware
//! Mission: Gate protected routes behind a live session
//!
//! Anonymous callers are redirected to the login entry point rather than
//! failing the operation outright.

use crate::auth::session::SESSION_COOKIE;
use crate::web::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use tracing::warn;

/// The authenticated identity, inserted into request extensions by
/// [`require_login`] so handlers can read it.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: i64,
}

/// Resolve the session cookie to a user id; redirect anonymous callers.
pub async fn require_login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match state.sessions.resolve(cookie.value()).await {
            Ok(Some(user_id)) => {
                req.extensions_mut().insert(CurrentUser { user_id });
                return next.run(req).await;
            }
            Ok(None) => {}
            Err(err) => {
                // A store outage makes the session unprovable; treat the
                // caller as anonymous rather than failing the request.
                warn!(error = %err, "session lookup failed");
            }
        }
    }

    Redirect::to("/login").into_response()
}
