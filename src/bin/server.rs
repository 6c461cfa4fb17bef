use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voxpass::{
    backend::{AppState, router::build_router},
    db::{create_pool, repository::Repository, run_migrations},
    identity::HostedAuth,
    utils::{config::ServerConfig, logs_fmt::UptimeSeconds},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_timer(UptimeSeconds),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,voxpass=debug".into()),
        )
        .init();

    info!("Starting voxpass API server");

    let cfg = ServerConfig::load()?;

    let pool = create_pool(&cfg.database_url).await?;
    run_migrations(&pool).await?;

    let repo = Arc::new(Repository::new(Arc::new(pool)));
    let identity = Arc::new(HostedAuth::new(
        cfg.auth_url.clone(),
        cfg.auth_anon_key.clone(),
    ));
    let state = AppState::new(repo, identity, cfg.site_url.clone(), cfg.api_key.clone());

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_millis(
                cfg.request_timeout_ms,
            )))
            .layer(CorsLayer::permissive()),
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port)).await?;
    info!("Listening on port {}", cfg.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully...");

    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Received shutdown signal");
    }
}
