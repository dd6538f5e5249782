use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use simrec_api::config::Config;
use simrec_api::routes::{create_router, AppState};
use simrec_api::store::SimilarityStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    // Serving without a model is forbidden: a missing or corrupt artifact
    // is a deployment problem, so load failure aborts startup.
    let store = match SimilarityStore::load(&config.model_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, path = %config.model_path, "Failed to load similarity model");
            return Err(e.into());
        }
    };
    tracing::info!(products = store.len(), "Similarity model loaded");

    let state = AppState {
        store: Arc::new(store),
        default_top_n: config.default_top_n,
    };
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
