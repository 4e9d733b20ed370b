//! Single prediction request: feature vector in, scalar out

use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::model::{InferenceError, Regressor};
use ndarray::Array2;
use tracing::{debug, warn};

/// Model output for one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub value: f64,
}

impl Prediction {
    /// Display form, two decimal places
    pub fn formatted(&self) -> String {
        format!("{:.2}", self.value)
    }
}

/// Run the model on one feature vector as a `(1, 6)` matrix.
pub fn run_prediction(
    model: &dyn Regressor,
    features: &FeatureVector,
) -> Result<Prediction, InferenceError> {
    let row = features.as_array();
    let x = Array2::from_shape_fn((1, FEATURE_COUNT), |(_, c)| row[c]);

    let result = model
        .predict(x.view())
        .and_then(|y| y.first().copied().ok_or(InferenceError::EmptyOutput))
        .map(|value| Prediction { value });

    match &result {
        Ok(p) => debug!(features = ?row, value = p.value, "Prediction computed"),
        Err(e) => warn!(features = ?row, error = %e, "Prediction failed"),
    }
    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::Feature;
    use ndarray::{Array1, ArrayView2};
    use std::sync::Mutex;

    /// Regressor that records every input row and answers from a closure.
    pub(crate) struct RecordingModel {
        pub calls: Mutex<Vec<Vec<Vec<f64>>>>,
        pub answer: fn(&[f64]) -> Result<Array1<f64>, InferenceError>,
    }

    impl RecordingModel {
        pub(crate) fn new(answer: fn(&[f64]) -> Result<Array1<f64>, InferenceError>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                answer,
            }
        }

        pub(crate) fn sum() -> Self {
            Self::new(|row| Ok(Array1::from(vec![row.iter().sum::<f64>()])))
        }

        pub(crate) fn last_call(&self) -> Option<Vec<Vec<f64>>> {
            self.calls.lock().unwrap().last().cloned()
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Regressor for RecordingModel {
        fn n_features(&self) -> usize {
            FEATURE_COUNT
        }

        fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
            let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();
            self.calls.lock().unwrap().push(rows.clone());
            (self.answer)(&rows[0])
        }
    }

    #[test]
    fn defaults_reach_the_model_as_one_ordered_row() {
        let model = RecordingModel::new(|_| Ok(Array1::from(vec![42.0])));
        let p = run_prediction(&model, &FeatureVector::default()).unwrap();

        assert_eq!(
            model.last_call().unwrap(),
            vec![vec![1.0, 60.0, 6.0, 2.0, 500.0, 500.0]]
        );
        assert_eq!(p.value, 42.0);
        assert_eq!(p.formatted(), "42.00");
    }

    #[test]
    fn formats_to_two_decimals() {
        assert_eq!(Prediction { value: 12.3456 }.formatted(), "12.35");
        assert_eq!(Prediction { value: 0.126 }.formatted(), "0.13");
        assert_eq!(Prediction { value: 1069.0 }.formatted(), "1069.00");
    }

    #[test]
    fn inference_error_is_returned_not_raised() {
        let model = RecordingModel::new(|_| {
            Err(InferenceError::ShapeMismatch {
                expected: 7,
                got: 6,
            })
        });
        let err = run_prediction(&model, &FeatureVector::default()).unwrap_err();
        assert!(err.to_string().contains("expected 7 features"));
        assert_eq!(model.call_count(), 1);
    }

    #[test]
    fn empty_model_output_is_an_error() {
        let model = RecordingModel::new(|_| Ok(Array1::from(Vec::new())));
        assert_eq!(
            run_prediction(&model, &FeatureVector::default()).unwrap_err(),
            InferenceError::EmptyOutput
        );
    }

    #[test]
    fn single_change_only_moves_that_column() {
        let model = RecordingModel::sum();
        let mut v = FeatureVector::default();
        run_prediction(&model, &v).unwrap();
        let before = model.last_call().unwrap()[0].clone();

        *v.value_mut(Feature::ImidazoleConcentration) = 250.0;
        run_prediction(&model, &v).unwrap();
        let after = model.last_call().unwrap()[0].clone();

        let changed: Vec<usize> = (0..FEATURE_COUNT).filter(|&i| before[i] != after[i]).collect();
        assert_eq!(changed, vec![Feature::ImidazoleConcentration.index()]);
        assert_eq!(after[4], 250.0);
    }
}
