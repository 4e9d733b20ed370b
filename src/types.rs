//! Common types and data structures

use crate::model::{ModelInfo, Regressor};
use crate::predict::Prediction;
use std::path::PathBuf;
use std::sync::Arc;

/// Whether the session can make predictions at all
#[derive(Clone)]
pub enum ModelState {
    Ready {
        model: Arc<dyn Regressor>,
        info: Option<ModelInfo>,
    },
    /// Startup failed; no prediction is possible for the rest of the process
    Unavailable { path: PathBuf, reason: String },
}

/// Result of the most recent prediction request
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Prediction),
    Failed(String),
}
