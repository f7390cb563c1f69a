//! Page error taxonomy with an explicit error-kind → response mapping.
//!
//! | Kind          | Response                                   |
//! |---------------|--------------------------------------------|
//! | `NotFound`    | 404 page                                   |
//! | `AuthRequired`| 303 redirect to `/login`                   |
//! | `Internal`    | generic 500 page, detail logged server-side|
//!
//! Validation errors and duplicate usernames never reach this type; they are
//! re-rendered inline on their forms by the handlers.

use crate::store::db::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum PageError {
    /// Missing task or page; rendered as the 404 page.
    NotFound,
    /// The current user vanished mid-session; treated as an authentication
    /// failure, not a server fault.
    AuthRequired,
    /// Store write failures and everything else unexpected.
    Internal(anyhow::Error),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => {
                (StatusCode::NOT_FOUND, super::views::not_found_page()).into_response()
            }
            PageError::AuthRequired => Redirect::to("/login").into_response(),
            PageError::Internal(err) => {
                error!(error = ?err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    super::views::server_error_page(),
                )
                    .into_response()
            }
        }
    }
}

impl From<anyhow::Error> for PageError {
    fn from(err: anyhow::Error) -> Self {
        PageError::Internal(err)
    }
}

impl From<StoreError> for PageError {
    fn from(err: StoreError) -> Self {
        PageError::Internal(err.into())
    }
}

impl From<minijinja::Error> for PageError {
    fn from(err: minijinja::Error) -> Self {
        PageError::Internal(err.into())
    }
}
