//! Application constants and configuration

pub const APP_NAME: &str = "Protein Predictor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Model artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "0921/ET_optimized.json";

pub const WINDOW_TITLE: &str =
    "Protein Separation Prediction Platform - Based on Extratrees Machine Learning Model";

pub const INTRO_TEXT: &str = "This platform allows input of experimental parameters for protein \
separation and provides predictions. Enter the parameters on the left and click \"Predict\" to \
obtain results based on the model.";

pub const INSTRUCTIONS: &[&str] = &[
    "Adjust experimental parameters and observe changes in predictions.",
    "The model is a tree ensemble trained for predicting protein separation experiment outcomes.",
    "Ensure input parameters are within a reasonable range for accurate predictions.",
];
