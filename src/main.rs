use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use datadock_api::config;
use datadock_api::database::{manager::DatabaseManager, schema};
use datadock_api::handlers;
use datadock_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Datadock API in {:?} mode", config.environment);

    // Bootstrap tables up front when the database is reachable; otherwise the
    // server still comes up and /health reports degraded until it is.
    if let Err(e) = schema::ensure_schema().await {
        tracing::warn!("schema bootstrap failed, continuing degraded: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("DATADOCK_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8080);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Datadock API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(api_routes())
        // Bundled frontend
        .fallback_service(ServeDir::new("static"))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(config::config().api.max_request_size_bytes)),
        )
}

fn auth_public_routes() -> Router {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn api_routes() -> Router {
    use handlers::protected::{aggregate, catalog, data, upload};

    Router::new()
        .route("/api/data", get(data::user_data))
        .route("/api/data/upload", post(upload::upload))
        .route("/api/data/types", get(catalog::record_types))
        .route("/api/data/fields", get(catalog::fields))
        .route("/api/data/aggregate", get(aggregate::aggregate))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
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
            axum::response::Json(json!({
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
