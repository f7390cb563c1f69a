//! Router assembly: public auth routes behind the rate limiter, gated task
//! routes behind the session check, static assets, compression, 404 fallback.

use crate::auth::require_login;
use crate::middleware::rate_limit::{AUTH_RATE_LIMIT, AUTH_RATE_WINDOW};
use crate::middleware::{rate_limit_middleware, request_logging, RateLimiter};
use crate::web::{handlers, AppState};
use axum::{
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer, services::ServeDir, set_header::SetResponseHeader,
};

pub fn router(state: AppState) -> Router {
    let auth_limiter = RateLimiter::new(AUTH_RATE_LIMIT, AUTH_RATE_WINDOW);

    let public_routes = Router::new()
        .route("/signup", get(handlers::signup_page).post(handlers::signup))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .layer(middleware::from_fn_with_state(
            auth_limiter,
            rate_limit_middleware,
        ));

    let protected_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/logout", get(handlers::logout))
        .route(
            "/add-task",
            get(handlers::add_task_page).post(handlers::add_task),
        )
        .route(
            "/edit-task/:id",
            get(handlers::edit_task_page).post(handlers::edit_task),
        )
        .route("/delete-task/:id", get(handlers::delete_task))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_login,
        ));

    // Static assets with a one-day cache, falling through to the 404 page.
    let assets = SetResponseHeader::if_not_present(
        ServeDir::new("public").not_found_service(handlers::not_found.into_service()),
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(public_routes)
        .merge(protected_routes)
        .fallback_service(assets)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(request_logging))
        .with_state(state)
}
