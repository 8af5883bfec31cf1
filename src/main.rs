mod config;
mod db;
mod predict;
mod routes;
mod score;
mod state;

use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curbscore=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;

    // A misconfigured store should surface at request time like every other
    // downstream failure, so a failed migration does not stop startup.
    if let Err(e) = db::run_migrations(&config.database_url).await {
        tracing::warn!("Skipping migrations: {}", e);
    }

    let state = Arc::new(state::AppState {
        predictor: Arc::new(predict::PredictionClient::new(&config)),
        store: Arc::new(db::PgStore::new(&config.database_url)),
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Curbscore listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
