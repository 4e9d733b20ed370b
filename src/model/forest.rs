//! Tree ensemble regressor and its JSON artifact format

use super::tree::{Tree, TreeArrays, TreeError};
use super::{InferenceError, Regressor};
use ndarray::{Array1, ArrayView2};
use serde::Deserialize;
use thiserror::Error;

/// How per-tree outputs are combined into one prediction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Plain average (extra-trees, random forest)
    #[default]
    Mean,
    /// Weighted median over `estimator_weights` (AdaBoost regressor)
    WeightedMedian,
}

impl Aggregation {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Mean => "mean",
            Aggregation::WeightedMedian => "weighted median",
        }
    }
}

fn default_model_type() -> String {
    "ExtraTreesRegressor".to_string()
}

/// On-disk model artifact
#[derive(Debug, Clone, Deserialize)]
pub struct ForestArtifact {
    #[serde(default = "default_model_type")]
    pub model_type: String,
    pub n_features_in: usize,
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub estimator_weights: Option<Vec<f64>>,
    pub trees: Vec<TreeArrays>,
}

/// Problems with an artifact that parsed but does not describe a usable model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model contains no trees")]
    EmptyForest,
    #[error("tree {index} is malformed: {source}")]
    InvalidTree {
        index: usize,
        #[source]
        source: TreeError,
    },
    #[error("expected {expected} estimator weights, found {got}")]
    WeightCount { expected: usize, got: usize },
    #[error("estimator weights must be non-negative with a positive sum")]
    InvalidWeights,
    #[error("{got} feature names given for {expected} features")]
    FeatureNames { expected: usize, got: usize },
    #[error("model expects {got} features, the form provides {expected}")]
    FeatureCount { expected: usize, got: usize },
}

/// Fitted tree ensemble. Immutable once built.
#[derive(Debug, Clone)]
pub struct Forest {
    model_type: String,
    n_features: usize,
    feature_names: Vec<String>,
    aggregation: Aggregation,
    weights: Vec<f64>,
    trees: Vec<Tree>,
}

impl Forest {
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, ModelError> {
        if artifact.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }
        let n_features = artifact.n_features_in;
        if !artifact.feature_names.is_empty() && artifact.feature_names.len() != n_features {
            return Err(ModelError::FeatureNames {
                expected: n_features,
                got: artifact.feature_names.len(),
            });
        }

        let n_trees = artifact.trees.len();
        let weights = match artifact.estimator_weights {
            Some(w) if w.len() != n_trees => {
                return Err(ModelError::WeightCount {
                    expected: n_trees,
                    got: w.len(),
                })
            }
            Some(w) => {
                let valid = w.iter().all(|x| x.is_finite() && *x >= 0.0);
                if !valid || w.iter().sum::<f64>() <= 0.0 {
                    return Err(ModelError::InvalidWeights);
                }
                w
            }
            None => vec![1.0; n_trees],
        };

        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                Tree::from_arrays(raw, n_features)
                    .map_err(|source| ModelError::InvalidTree { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            model_type: artifact.model_type,
            n_features,
            feature_names: artifact.feature_names,
            aggregation: artifact.aggregation,
            weights,
            trees,
        })
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Predict one row. Inputs are rounded to `f32` first, matching how the
    /// exporter's training library stores samples before comparing thresholds.
    pub fn predict_row(&self, row: &[f32]) -> f64 {
        match self.aggregation {
            Aggregation::Mean => {
                let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
                sum / self.trees.len() as f64
            }
            Aggregation::WeightedMedian => {
                let preds: Vec<f64> = self.trees.iter().map(|t| t.predict_row(row)).collect();
                weighted_median(&preds, &self.weights)
            }
        }
    }
}

/// First prediction, in ascending order, whose cumulative weight reaches half
/// the total.
fn weighted_median(preds: &[f64], weights: &[f64]) -> f64 {
    let mut order: Vec<usize> = (0..preds.len()).collect();
    order.sort_by(|&a, &b| preds[a].total_cmp(&preds[b]));

    let half = 0.5 * weights.iter().sum::<f64>();
    let mut cdf = 0.0;
    for &i in &order {
        cdf += weights[i];
        if cdf >= half {
            return preds[i];
        }
    }
    order.last().map(|&i| preds[i]).unwrap_or(f64::NAN)
}

impl Regressor for Forest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        if x.ncols() != self.n_features {
            return Err(InferenceError::ShapeMismatch {
                expected: self.n_features,
                got: x.ncols(),
            });
        }

        let mut out = Vec::with_capacity(x.nrows());
        let mut row_f32 = vec![0f32; self.n_features];
        for (r, row) in x.rows().into_iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                // Values beyond f32 range become infinite after the cast
                let v = v as f32;
                if !v.is_finite() {
                    return Err(InferenceError::NonFinite { row: r, feature: c });
                }
                row_f32[c] = v;
            }
            out.push(self.predict_row(&row_f32));
        }
        Ok(Array1::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::tests::stump;
    use ndarray::array;

    fn artifact(trees: Vec<TreeArrays>) -> ForestArtifact {
        ForestArtifact {
            model_type: default_model_type(),
            n_features_in: 6,
            feature_names: Vec::new(),
            aggregation: Aggregation::Mean,
            estimator_weights: None,
            trees,
        }
    }

    #[test]
    fn mean_averages_tree_outputs() {
        let forest = Forest::from_artifact(artifact(vec![
            stump(1, 60.0, 10.0, 20.0),
            stump(4, 400.0, 30.0, 40.0),
        ]))
        .unwrap();

        let x = array![[1.0, 60.0, 6.0, 2.0, 500.0, 500.0]];
        let y = forest.predict(x.view()).unwrap();
        assert_eq!(y.len(), 1);
        assert_eq!(y[0], (10.0 + 40.0) / 2.0);
    }

    #[test]
    fn weighted_median_picks_heaviest_half() {
        let mut a = artifact(vec![
            stump(0, 0.0, 1.0, 1.0),
            stump(0, 0.0, 2.0, 2.0),
            stump(0, 0.0, 3.0, 3.0),
        ]);
        a.aggregation = Aggregation::WeightedMedian;
        a.estimator_weights = Some(vec![0.1, 0.2, 0.9]);
        let forest = Forest::from_artifact(a).unwrap();
        // cdf over sorted preds: 0.1, 0.3, 1.2; half of 1.2 is 0.6
        assert_eq!(forest.predict_row(&[0.0; 6]), 3.0);

        assert_eq!(weighted_median(&[5.0, 1.0, 3.0], &[1.0, 1.0, 1.0]), 3.0);
        assert_eq!(weighted_median(&[4.0, 2.0], &[1.0, 1.0]), 2.0);
    }

    #[test]
    fn inputs_are_compared_at_single_precision() {
        // 0.1f64 rounds up to 0.100000001490116... as f32, which is above the threshold
        let forest = Forest::from_artifact(artifact(vec![stump(0, 0.1, -1.0, 1.0)])).unwrap();
        let x = array![[0.1, 0.0, 0.0, 0.0, 0.0, 0.0]];
        assert_eq!(forest.predict(x.view()).unwrap()[0], 1.0);
    }

    #[test]
    fn predict_rejects_wrong_width_and_non_finite() {
        let forest = Forest::from_artifact(artifact(vec![stump(0, 1.0, 0.0, 1.0)])).unwrap();

        let narrow = array![[1.0, 2.0, 3.0]];
        assert_eq!(
            forest.predict(narrow.view()).unwrap_err(),
            InferenceError::ShapeMismatch {
                expected: 6,
                got: 3
            }
        );

        let nan = array![[1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0]];
        assert_eq!(
            forest.predict(nan.view()).unwrap_err(),
            InferenceError::NonFinite { row: 0, feature: 2 }
        );
    }

    #[test]
    fn predict_rejects_values_too_large_for_single_precision() {
        let forest = Forest::from_artifact(artifact(vec![stump(0, 1.0, 10.0, 20.0)])).unwrap();

        let huge = array![[1e39, 60.0, 6.0, 2.0, 500.0, 500.0]];
        assert_eq!(
            forest.predict(huge.view()).unwrap_err(),
            InferenceError::NonFinite { row: 0, feature: 0 }
        );

        let negative = array![[1.0, 60.0, 6.0, 2.0, 500.0, -1e39]];
        assert_eq!(
            forest.predict(negative.view()).unwrap_err(),
            InferenceError::NonFinite { row: 0, feature: 5 }
        );

        let largest = array![[f32::MAX as f64, 60.0, 6.0, 2.0, 500.0, 500.0]];
        assert_eq!(forest.predict(largest.view()).unwrap()[0], 20.0);
    }

    #[test]
    fn artifact_level_validation() {
        assert_eq!(
            Forest::from_artifact(artifact(vec![])).unwrap_err(),
            ModelError::EmptyForest
        );

        let mut a = artifact(vec![stump(0, 1.0, 0.0, 1.0)]);
        a.estimator_weights = Some(vec![1.0, 2.0]);
        assert_eq!(
            Forest::from_artifact(a).unwrap_err(),
            ModelError::WeightCount {
                expected: 1,
                got: 2
            }
        );

        let mut a = artifact(vec![stump(0, 1.0, 0.0, 1.0)]);
        a.estimator_weights = Some(vec![0.0]);
        assert_eq!(Forest::from_artifact(a).unwrap_err(), ModelError::InvalidWeights);

        let mut a = artifact(vec![stump(0, 1.0, 0.0, 1.0)]);
        a.feature_names = vec!["a".into()];
        assert!(matches!(
            Forest::from_artifact(a),
            Err(ModelError::FeatureNames { expected: 6, got: 1 })
        ));

        let err = Forest::from_artifact(artifact(vec![
            stump(0, 1.0, 0.0, 1.0),
            stump(9, 1.0, 0.0, 1.0),
        ]))
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidTree { index: 1, .. }));
        assert!(err.to_string().contains("tree 1"));
    }

    #[test]
    fn parses_exported_json() {
        let json = r#"{
            "model_type": "AdaBoostRegressor",
            "n_features_in": 6,
            "aggregation": "weighted_median",
            "estimator_weights": [1.0],
            "trees": [{
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [3, -2, -2],
                "threshold": [2.5, -2.0, -2.0],
                "value": [[[0.5]], [[0.25]], [[0.75]]]
            }]
        }"#;
        let a: ForestArtifact = serde_json::from_str(json).unwrap();
        let forest = Forest::from_artifact(a).unwrap();
        assert_eq!(forest.model_type(), "AdaBoostRegressor");
        assert_eq!(forest.aggregation(), Aggregation::WeightedMedian);
        assert_eq!(forest.n_trees(), 1);
        assert_eq!(forest.predict_row(&[0.0, 0.0, 0.0, 2.0, 0.0, 0.0]), 0.25);
        assert_eq!(forest.predict_row(&[0.0, 0.0, 0.0, 3.0, 0.0, 0.0]), 0.75);
    }
}
