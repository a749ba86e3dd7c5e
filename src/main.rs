use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use festix_server::config::session::SESSION_PRUNE_INTERVAL;
use festix_server::config::Config;
use festix_server::routes::create_routes;
use festix_server::services::accounts;
use festix_server::state::AppState;
use festix_server::store::PostgresStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "festix_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let store = Arc::new(PostgresStore::new(pool));

    if let Some(seed) = &config.admin {
        accounts::ensure_admin(&*store, seed)
            .await
            .expect("Failed to seed admin account");
    }

    let state = AppState::new(store);
    tokio::spawn(
        state
            .sessions()
            .clone()
            .prune_periodically(SESSION_PRUNE_INTERVAL),
    );

    let app: Router = create_routes(state, &config);

    let addr = config.socket_addr();
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
