pub mod root;

use axum::{middleware, routing::get, routing::post, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{jwt_auth_middleware, require_root_middleware};
use crate::state::AppState;

/// Assembles the full application router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(info))
        .route("/health", get(health))
        // Restricted reset governor + registry surface
        .merge(root_routes(state))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn root_routes(state: AppState) -> Router {
    Router::new()
        // Tenant registry
        .route("/api/root/tenant", get(root::tenant::list).post(root::tenant::create))
        .route("/api/root/tenant/:id", get(root::tenant::show))
        // Reset execution (dry-run and real, selected by body flag)
        .route("/api/root/reset/tenant/:id", post(root::reset::tenant_reset))
        .route(
            "/api/root/reset/tenant/:id/confirmation",
            post(root::confirm::tenant_confirmation),
        )
        .route("/api/root/reset/system", post(root::reset::system_reset))
        .route(
            "/api/root/reset/system/confirmation",
            post(root::confirm::system_confirmation),
        )
        // Audit ledger
        .route(
            "/api/root/reset/actions",
            get(root::actions::list).delete(root::actions::delete_many),
        )
        .route(
            "/api/root/reset/actions/:id",
            get(root::actions::show).delete(root::actions::delete_one),
        )
        // Capability check once at the boundary, after authentication
        .layer(middleware::from_fn(require_root_middleware))
        .layer(middleware::from_fn(jwt_auth_middleware))
        .with_state(state)
}

async fn info() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Retail Ops API",
            "version": version,
            "description": "Multi-tenant retail operations backend with a governed destructive data reset subsystem",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "tenants": "/api/root/tenant[/:id] (restricted, root access)",
                "reset": "/api/root/reset/{tenant/:id,system} (restricted, root access)",
                "confirmation": "/api/root/reset/{tenant/:id,system}/confirmation (restricted, root access)",
                "actions": "/api/root/reset/actions[/:id] (restricted, root access)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
