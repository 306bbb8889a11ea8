//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::time::Duration;

use auth::domain::repository::CredentialStore;
use auth::{AuthConfig, AuthService, InMemoryCredentialStore, PgCredentialStore, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

/// Throttle windows are swept on this interval
const THROTTLE_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Credential store selection
    let auth_routes = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(config.auth.store_timeout)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            build_auth_routes(PgCredentialStore::new(pool), config.auth.clone()).await?
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory credential store");
            build_auth_routes(InMemoryCredentialStore::new(), config.auth.clone()).await?
        }
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .merge(auth_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the auth routes and start the throttle sweeper for this store
async fn build_auth_routes<S>(store: S, auth_config: AuthConfig) -> anyhow::Result<Router>
where
    S: CredentialStore + Send + Sync + 'static,
{
    let service = AuthService::from_config(store, auth_config);
    service.warm_up().await?;

    let sweeper = service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(THROTTLE_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sweeper.purge_throttle().await;
            if purged > 0 {
                tracing::debug!(windows_purged = purged, "Login throttle sweep");
            }
        }
    });

    Ok(auth_router(service))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
