use std::sync::Arc;

use retail_ops_api::config;
use retail_ops_api::database::{
    DatabaseManager, PgCategoryStore, PgCleanupJobStore, PgLedgerStore, PgTenantStore,
};
use retail_ops_api::governor::LogNotifier;
use retail_ops_api::handlers::app;
use retail_ops_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Retail Ops API in {:?} mode", config.environment);

    let pool = DatabaseManager::ops_pool()
        .await
        .unwrap_or_else(|e| panic!("failed to connect to operations database: {}", e));

    let state = AppState::build(
        Arc::new(PgLedgerStore::new(pool.clone(), config.governor.max_list_limit)),
        Arc::new(PgCategoryStore::new(pool.clone())),
        Arc::new(PgTenantStore::new(pool.clone())),
        Arc::new(PgCleanupJobStore::new(pool)),
        Arc::new(LogNotifier),
        config.governor.clone(),
    );

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("RETAIL_OPS_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Retail Ops API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
