//! Request handling behind the form, independent of rendering

use crate::features::{Feature, FeatureVector};
use crate::model::{LoadError, LoadedModel};
use crate::predict::run_prediction;
use crate::types::{ModelState, Outcome};
use std::path::PathBuf;

pub struct Session {
    state: ModelState,
    inputs: FeatureVector,
    outcome: Option<Outcome>,
}

impl Session {
    pub fn new(state: ModelState) -> Self {
        Self {
            state,
            inputs: FeatureVector::default(),
            outcome: None,
        }
    }

    #[cfg(test)]
    pub fn with_model(model: std::sync::Arc<dyn crate::model::Regressor>) -> Self {
        Self::new(ModelState::Ready { model, info: None })
    }

    /// Session from the startup load result
    pub fn from_load(path: PathBuf, loaded: Result<LoadedModel, LoadError>) -> Self {
        let state = match loaded {
            Ok(loaded) => ModelState::Ready {
                model: loaded.regressor(),
                info: Some(loaded.info),
            },
            Err(e) => ModelState::Unavailable {
                path,
                reason: e.to_string(),
            },
        };
        Self::new(state)
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready { .. })
    }

    pub fn inputs(&self) -> &FeatureVector {
        &self.inputs
    }

    pub fn input_mut(&mut self, feature: Feature) -> &mut f64 {
        self.inputs.value_mut(feature)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Handle the predict trigger. Does nothing when no model is available.
    pub fn submit(&mut self) {
        let ModelState::Ready { model, .. } = &self.state else {
            return;
        };
        self.outcome = Some(match run_prediction(model.as_ref(), &self.inputs) {
            Ok(p) => Outcome::Success(p),
            Err(e) => Outcome::Failed(e.to_string()),
        });
    }

    pub fn reset(&mut self) {
        self.inputs = FeatureVector::default();
        self.outcome = None;
    }
}
