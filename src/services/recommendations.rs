use crate::models::Recommendation;
use crate::store::SimilarityStore;

/// Returns the Top-N products most similar to `product_id`
///
/// Takes the similarity column for the product, drops the self entry, and
/// keeps the `top_n` highest scores in descending order. Equal scores are
/// ordered by ascending product id: the upstream model does not define an
/// ordering for ties, so a deterministic secondary key is imposed here to
/// make repeated queries reproducible.
///
/// An unknown product or `top_n == 0` yields an empty result rather than an
/// error; the caller surfaces that as "no recommendations found".
pub fn get_recommendations(
    store: &SimilarityStore,
    product_id: &str,
    top_n: usize,
) -> Vec<Recommendation> {
    if top_n == 0 {
        return Vec::new();
    }

    let Some(column) = store.column(product_id) else {
        tracing::debug!(product_id, "Unknown product, returning empty result");
        return Vec::new();
    };

    let mut candidates: Vec<(&str, f64)> =
        column.filter(|(id, _)| *id != product_id).collect();

    // Scores are validated finite at load, so total_cmp gives a total order.
    candidates.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    candidates.truncate(top_n);

    tracing::debug!(product_id, returned = candidates.len(), "Computed recommendations");

    candidates
        .into_iter()
        .map(|(id, score)| Recommendation {
            product_id: id.to_string(),
            score,
        })
        .collect()
}
