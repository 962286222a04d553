use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use ciyu_api::{config::ApiConfig, state::ApiState};
use ciyu_db::PgStore;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;

    ciyu_api::tracing::init_tracing(&config.env);

    let metrics_handle = ciyu_api::metrics::init_metrics()?;
    tracing::info!("Prometheus metrics exporter initialized");

    let pool = ciyu_db::create_pool(&config.database_url, config.database_max_connections).await?;
    ciyu_db::ensure_db_and_migrate(&config.database_url, &pool).await?;
    tracing::info!("Database migrations applied");

    let state = ApiState::new(&config, Arc::new(PgStore::new(pool)));

    let cors = ciyu_api::middleware::cors::create_cors_layer(config.parsed_allowed_origins());

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Kept on its own state so scraping never touches the practice store
    let metrics_app = Router::new()
        .route("/metrics", get(ciyu_api::metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = ciyu_api::router::router()
        .merge(metrics_app)
        .with_state(state)
        .layer(cors)
        .layer(trace_layer)
        .layer(middleware::from_fn(ciyu_api::metrics::track_metrics))
        .layer(middleware::from_fn(
            ciyu_api::middleware::request_id::request_id_middleware,
        ));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, environment = ?config.env, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
