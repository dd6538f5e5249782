use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::Recommendation,
    services::{export, recommendations},
};

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub product_id: String,
    pub top_n: Option<usize>,
}

/// Handler for the recommendations endpoint
///
/// An unknown product id answers 200 with an empty list; the UI treats that
/// as an informational "nothing found" message, not a failure.
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> Json<Vec<Recommendation>> {
    let top_n = params.top_n.unwrap_or(state.default_top_n);
    let recs = recommendations::get_recommendations(&state.store, &params.product_id, top_n);
    Json(recs)
}

/// Handler for the CSV download endpoint
pub async fn export(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Response> {
    let top_n = params.top_n.unwrap_or(state.default_top_n);
    let recs = recommendations::get_recommendations(&state.store, &params.product_id, top_n);
    let body = export::to_csv(&recs)?;

    let disposition = format!("attachment; filename=\"recs_{}.csv\"", params.product_id);
    let disposition = HeaderValue::from_str(&disposition).map_err(|_| {
        AppError::InvalidInput(format!(
            "product id {:?} is not usable in a download filename",
            params.product_id
        ))
    })?;

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("text/csv")),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, body).into_response())
}
