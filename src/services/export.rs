use crate::error::{AppError, AppResult};
use crate::models::Recommendation;

/// Column headers expected by downstream consumers of the download endpoint
const CSV_HEADER: [&str; 2] = ["Recommended Product ID", "Similarity Score"];

/// Renders a recommendation list as CSV bytes
///
/// One row per entry in result order, scores at full precision. Pure
/// formatting; an empty result produces a header-only file.
pub fn to_csv(recommendations: &[Recommendation]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for rec in recommendations {
        let score = rec.score.to_string();
        writer.write_record([rec.product_id.as_str(), score.as_str()])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))
}
