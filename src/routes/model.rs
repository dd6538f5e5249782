use axum::{extract::State, Json};

use super::AppState;
use crate::models::ModelInfo;

/// Handler for the model info endpoint
pub async fn info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(ModelInfo {
        product_count: state.store.len(),
        loaded_at: state.store.loaded_at(),
    })
}
