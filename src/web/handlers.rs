//! Page Handlers
//! Mission: Wire forms, sessions and the task manager into the eight routes

use crate::auth::credentials::{hash_password, verify_password};
use crate::auth::{removal_cookie, session_cookie, CurrentUser, SESSION_COOKIE};
use crate::models::{fresh_id, User};
use crate::store::db::StoreError;
use crate::validate::{
    validate_login, validate_signup, validate_task, FieldError, LoginForm, SignupForm, TaskForm,
};
use crate::web::{AppState, PageError};
use axum::{
    extract::{Extension, Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::SignedCookieJar;
use minijinja::context;
use serde::Serialize;
use tracing::info;

const USERNAME_TAKEN: &str = "Username already taken";
const INVALID_CREDENTIALS: &str = "Invalid username or password";

fn no_errors() -> Vec<FieldError> {
    Vec::new()
}

pub async fn signup_page(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    state.views.render(
        "signup.html",
        context! { error => Option::<&str>::None, errors => no_errors() },
    )
}

pub async fn signup(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, PageError> {
    let errors = validate_signup(&form);
    if !errors.is_empty() {
        return Ok(state
            .views
            .render(
                "signup.html",
                context! { error => Option::<&str>::None, errors },
            )?
            .into_response());
    }

    let username = form.username.trim().to_string();

    // Fast-path duplicate check for a friendlier message. The read path
    // degrades to empty on store outage, so the unique index below stays
    // the authoritative signal.
    if !state.store.find_users(Some(username.as_str())).await.is_empty() {
        return Ok(state
            .views
            .render(
                "signup.html",
                context! { error => USERNAME_TAKEN, errors => no_errors() },
            )?
            .into_response());
    }

    let password_hash = hash_password(&form.password).await?;
    let user = User {
        id: fresh_id(),
        username,
        password_hash,
    };

    match state.store.insert_user(&user).await {
        Ok(()) => {}
        Err(StoreError::DuplicateUsername) => {
            // Lost the check-then-insert race; same message as the fast path.
            return Ok(state
                .views
                .render(
                    "signup.html",
                    context! { error => USERNAME_TAKEN, errors => no_errors() },
                )?
                .into_response());
        }
        Err(err) => return Err(err.into()),
    }

    info!(username = %user.username, "✅ User signed up");

    // Signup auto-authenticates before sending the user to the login page.
    let session_id = state.sessions.create(user.id).await?;
    let jar = jar.add(session_cookie(&session_id, state.production));
    Ok((jar, Redirect::to("/login")).into_response())
}

pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    state.views.render(
        "login.html",
        context! { error => Option::<&str>::None, errors => no_errors() },
    )
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let errors = validate_login(&form);
    if !errors.is_empty() {
        return Ok(state
            .views
            .render(
                "login.html",
                context! { error => Option::<&str>::None, errors },
            )?
            .into_response());
    }

    let username = form.username.trim();
    let users = state.store.find_users(Some(username)).await;

    // One generic message for unknown usernames and wrong passwords; no
    // oracle for username existence.
    let Some(user) = users.into_iter().next() else {
        return Ok(state
            .views
            .render(
                "login.html",
                context! { error => INVALID_CREDENTIALS, errors => no_errors() },
            )?
            .into_response());
    };

    if !verify_password(&form.password, &user.password_hash).await? {
        return Ok(state
            .views
            .render(
                "login.html",
                context! { error => INVALID_CREDENTIALS, errors => no_errors() },
            )?
            .into_response());
    }

    let session_id = state.sessions.create(user.id).await?;
    let jar = jar.add(session_cookie(&session_id, state.production));
    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Response, PageError> {
    // Destroy the server-side record, not merely the cookie.
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await?;
    }
    let jar = jar.remove(removal_cookie());
    Ok((jar, Redirect::to("/login")).into_response())
}

pub async fn index(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, PageError> {
    let tasks = state.tasks.list(current.user_id).await;

    // Resolve the current user from the unscoped users read.
    let users = state.store.find_users(None).await;
    let Some(current_user) = users.into_iter().find(|u| u.id == current.user_id) else {
        // The session points at a vanished user: an authentication failure,
        // not a server fault.
        return Err(PageError::AuthRequired);
    };

    Ok(state
        .views
        .render("index.html", context! { tasks, current_user })?
        .into_response())
}

pub async fn add_task_page(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    state
        .views
        .render("add-task.html", context! { errors => no_errors() })
}

pub async fn add_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<TaskForm>,
) -> Result<Response, PageError> {
    let draft = match validate_task(&form) {
        Ok(draft) => draft,
        Err(errors) => {
            return Ok(state
                .views
                .render("add-task.html", context! { errors })?
                .into_response());
        }
    };

    state.tasks.create(current.user_id, draft).await?;
    Ok(Redirect::to("/").into_response())
}

pub async fn edit_task_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let task = state
        .tasks
        .get(current.user_id, id)
        .await
        .ok_or(PageError::NotFound)?;
    state
        .views
        .render("edit-task.html", context! { task, errors => no_errors() })
}

pub async fn edit_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<TaskForm>,
) -> Result<Response, PageError> {
    let draft = match validate_task(&form) {
        Ok(draft) => draft,
        Err(errors) => {
            let task = state
                .tasks
                .get(current.user_id, id)
                .await
                .ok_or(PageError::NotFound)?;
            return Ok(state
                .views
                .render("edit-task.html", context! { task, errors })?
                .into_response());
        }
    };

    // Owner-scoped update: a foreign or unknown id changes nothing and still
    // redirects, so existence never leaks.
    let update = crate::models::TaskUpdate {
        title: draft.title,
        description: draft.description,
        category: draft.category,
        status: draft.status,
        deadline: draft.deadline,
        priority: draft.priority,
    };
    state.tasks.update(current.user_id, id, update).await?;
    Ok(Redirect::to("/").into_response())
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    state.tasks.delete(current.user_id, id).await?;
    Ok(Redirect::to("/").into_response())
}

/// Fallback for unmatched routes.
pub async fn not_found() -> PageError {
    PageError::NotFound
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
