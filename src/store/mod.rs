//! In-memory store for the precomputed item-similarity matrix.
//!
//! The matrix is computed offline and serialized with pandas
//! `DataFrame.to_json(orient="split")`. It is loaded exactly once at
//! startup, validated, and never mutated afterwards, so handlers can share
//! it behind an `Arc` without locking.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the similarity artifact.
///
/// All of these are fatal: the application must halt at startup rather than
/// serve without a model.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("similarity artifact not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read similarity artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to deserialize similarity artifact: {0}")]
    Load(#[from] serde_json::Error),

    #[error("malformed similarity artifact: {0}")]
    Malformed(String),
}

/// Axis label as serialized by pandas. Product ids are opaque strings, but
/// `to_json` emits bare numbers for identifiers that look numeric, so both
/// forms must be accepted and normalized to strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AxisLabel {
    Text(String),
    Number(serde_json::Number),
}

impl AxisLabel {
    fn into_string(self) -> String {
        match self {
            AxisLabel::Text(s) => s,
            AxisLabel::Number(n) => n.to_string(),
        }
    }
}

/// On-disk layout of `DataFrame.to_json(orient="split")`.
#[derive(Debug, Deserialize)]
struct MatrixArtifact {
    columns: Vec<AxisLabel>,
    index: Vec<AxisLabel>,
    data: Vec<Vec<f64>>,
}

/// The loaded similarity matrix plus the lookup structures built from it.
///
/// Square: every product appears on both axes. Symmetry of the scores is a
/// property of the upstream training step and is not enforced here.
pub struct SimilarityStore {
    /// Product ids in artifact order (one per row/column).
    ids: Vec<String>,
    /// Product id -> axis position.
    positions: HashMap<String, usize>,
    /// Row-major n*n score block. Validated finite at load.
    scores: Vec<f64>,
    /// Product ids sorted ascending, precomputed for the selector endpoint.
    sorted_ids: Vec<String>,
    loaded_at: DateTime<Utc>,
}

impl SimilarityStore {
    /// Loads and validates the similarity artifact at `path`.
    ///
    /// The file handle is scoped to this call and released on every exit
    /// path, including failures.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading similarity artifact");

        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
            _ => StoreError::Io(e),
        })?;
        let artifact: MatrixArtifact = serde_json::from_reader(BufReader::new(file))?;

        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: MatrixArtifact) -> Result<Self, StoreError> {
        let columns: Vec<String> = artifact
            .columns
            .into_iter()
            .map(AxisLabel::into_string)
            .collect();
        let index: Vec<String> = artifact
            .index
            .into_iter()
            .map(AxisLabel::into_string)
            .collect();

        if columns != index {
            return Err(StoreError::Malformed(
                "row and column labels are not identical".to_string(),
            ));
        }

        let n = columns.len();
        if artifact.data.len() != n {
            return Err(StoreError::Malformed(format!(
                "expected {} rows, found {}",
                n,
                artifact.data.len()
            )));
        }

        let mut positions = HashMap::with_capacity(n);
        for (pos, id) in columns.iter().enumerate() {
            if positions.insert(id.clone(), pos).is_some() {
                return Err(StoreError::Malformed(format!(
                    "duplicate product id {:?}",
                    id
                )));
            }
        }

        let mut scores = Vec::with_capacity(n * n);
        for (row, cells) in artifact.data.into_iter().enumerate() {
            if cells.len() != n {
                return Err(StoreError::Malformed(format!(
                    "row {} has {} cells, expected {}",
                    columns[row],
                    cells.len(),
                    n
                )));
            }
            for (col, cell) in cells.iter().enumerate() {
                if !cell.is_finite() {
                    return Err(StoreError::Malformed(format!(
                        "non-finite score at ({}, {})",
                        columns[row], columns[col]
                    )));
                }
            }
            scores.extend(cells);
        }

        let mut sorted_ids = columns.clone();
        sorted_ids.sort_unstable();

        tracing::info!(products = n, "Similarity matrix validated");

        Ok(Self {
            ids: columns,
            positions,
            scores,
            sorted_ids,
            loaded_at: Utc::now(),
        })
    }

    /// All product ids, sorted ascending. Backs the product selector.
    pub fn products(&self) -> &[String] {
        &self.sorted_ids
    }

    /// Whether `product_id` is a known product.
    pub fn contains(&self, product_id: &str) -> bool {
        self.positions.contains_key(product_id)
    }

    /// Number of products in the matrix.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// When the artifact was loaded into this process.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// The similarity column for `product_id`: one `(id, score)` pair per
    /// product (the query product included), in artifact order. Returns
    /// `None` when the product is unknown.
    pub fn column(&self, product_id: &str) -> Option<impl Iterator<Item = (&str, f64)> + '_> {
        let col = *self.positions.get(product_id)?;
        let n = self.ids.len();
        Some(
            self.ids
                .iter()
                .enumerate()
                .map(move |(row, id)| (id.as_str(), self.scores[row * n + col])),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load_json(artifact: &serde_json::Value) -> Result<SimilarityStore, StoreError> {
        load_raw(&artifact.to_string())
    }

    fn load_raw(artifact: &str) -> Result<SimilarityStore, StoreError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.json");
        std::fs::write(&path, artifact).unwrap();
        SimilarityStore::load(&path)
    }

    fn sample_artifact() -> serde_json::Value {
        // Deliberately unsorted axis order.
        json!({
            "columns": ["B", "A", "D", "C"],
            "index": ["B", "A", "D", "C"],
            "data": [
                [1.0, 0.8, 0.3, 0.4],
                [0.8, 1.0, 0.2, 0.5],
                [0.3, 0.2, 1.0, 0.6],
                [0.4, 0.5, 0.6, 1.0]
            ]
        })
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = SimilarityStore::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_unparseable_artifact_is_load_error() {
        let result = load_raw("not json at all");
        assert!(matches!(result, Err(StoreError::Load(_))));
    }

    #[test]
    fn test_products_sorted_ascending() {
        let store = load_json(&sample_artifact()).unwrap();
        assert_eq!(store.products(), ["A", "B", "C", "D"]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_numeric_labels_normalized_to_strings() {
        let store = load_json(&json!({
            "columns": [101, 205],
            "index": [101, 205],
            "data": [[1.0, 0.5], [0.5, 1.0]]
        }))
        .unwrap();

        assert_eq!(store.products(), ["101", "205"]);
        assert!(store.contains("101"));
        assert!(!store.contains("301"));
    }

    #[test]
    fn test_mixed_labels_normalized_consistently() {
        // One axis numeric, the other string: identical after normalization.
        let store = load_json(&json!({
            "columns": [7, "B00X"],
            "index": ["7", "B00X"],
            "data": [[1.0, 0.2], [0.2, 1.0]]
        }))
        .unwrap();

        assert!(store.contains("7"));
    }

    #[test]
    fn test_mismatched_axes_rejected() {
        let result = load_json(&json!({
            "columns": ["A", "B"],
            "index": ["A", "C"],
            "data": [[1.0, 0.5], [0.5, 1.0]]
        }));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_non_square_data_rejected() {
        let result = load_json(&json!({
            "columns": ["A", "B"],
            "index": ["A", "B"],
            "data": [[1.0, 0.5]]
        }));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = load_json(&json!({
            "columns": ["A", "B"],
            "index": ["A", "B"],
            "data": [[1.0, 0.5], [0.5]]
        }));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = load_json(&json!({
            "columns": ["A", "A"],
            "index": ["A", "A"],
            "data": [[1.0, 1.0], [1.0, 1.0]]
        }));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_overflowing_score_rejected() {
        // 1e999 overflows f64; rejected at parse or at the finite check.
        let result = load_raw(
            r#"{"columns":["A","B"],"index":["A","B"],"data":[[1.0,1e999],[0.5,1.0]]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_column_returns_scores_for_every_product() {
        let store = load_json(&sample_artifact()).unwrap();
        let column: Vec<(&str, f64)> = store.column("A").unwrap().collect();

        assert_eq!(column.len(), 4);
        assert!(column.contains(&("A", 1.0)));
        assert!(column.contains(&("B", 0.8)));
        assert!(column.contains(&("C", 0.5)));
        assert!(column.contains(&("D", 0.2)));
    }

    #[test]
    fn test_column_unknown_product_is_none() {
        let store = load_json(&sample_artifact()).unwrap();
        assert!(store.column("Z").is_none());
    }
}
