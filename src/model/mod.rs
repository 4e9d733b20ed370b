//! Regression model: artifact loading, caching and inference

mod forest;
mod store;
mod tree;

pub use store::{LoadError, LoadedModel, ModelInfo, ModelStore};

use ndarray::{Array1, ArrayView2};
use thiserror::Error;

/// Failure while computing a prediction. Recoverable per request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("expected {expected} features per row, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("input row {row}, feature {feature} is not a finite number")]
    NonFinite { row: usize, feature: usize },
    #[error("model returned no output")]
    EmptyOutput,
}

/// A fitted model exposing a single inference operation.
///
/// `predict` takes an `(n_rows, n_features)` matrix and returns one value
/// per row.
pub trait Regressor {
    fn n_features(&self) -> usize;

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError>;
}
