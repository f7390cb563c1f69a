//! TaskFlow - session-authenticated task management server
//! Mission: Serve signup/login and owner-scoped task CRUD over rendered pages

use anyhow::{Context, Result};
use std::net::SocketAddr;
use taskflow_backend::{models::Config, store::Db, web};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Refuses to start without DATABASE_URL and SESSION_SECRET.
    let config = Config::from_env()?;
    init_tracing();

    info!("🚀 TaskFlow server starting");

    let db = Db::open(&config.database_url)?;
    let state = web::AppState::build(
        db,
        &config.session_secret,
        config.production,
        config.cache_ttl(),
    )
    .context("Failed to build application state")?;

    info!("🔐 Sessions and cache initialized");

    let app = web::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
