use axum::{extract::State, Json};

use super::AppState;

/// Handler for the product listing endpoint
///
/// Returns every known product id, sorted ascending, for populating a
/// selection control.
pub async fn list(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.store.products().to_vec())
}
