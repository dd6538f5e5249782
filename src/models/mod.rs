use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a recommendation result: a product and its similarity to
/// the query product. Scores carry full f64 precision; rounding is a
/// presentation concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub product_id: String,
    pub score: f64,
}

/// Read-only facts about the loaded similarity model
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    /// Number of products in the matrix
    pub product_count: usize,
    /// When the artifact was loaded into this process
    pub loaded_at: DateTime<Utc>,
}
