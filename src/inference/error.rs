use thiserror::Error;

use crate::battery::ShapeError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[cfg_attr(not(feature = "onnx"), allow(dead_code))]
    #[error("failed to load model {path}: {message}")]
    Load { path: String, message: String },
    #[error("model backend unavailable: rebuild with `--features onnx` to load {0}")]
    BackendUnavailable(String),
    #[cfg_attr(not(feature = "onnx"), allow(dead_code))]
    #[error("{0}")]
    Runtime(String),
    #[error("model returned no output")]
    EmptyOutput,
    #[error("model returned a non-finite prediction: {0}")]
    NonFinite(f32),
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("invalid input shape: {0}")]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Model(#[from] ModelError),
}
