mod error;
mod model;
#[cfg(feature = "onnx")]
mod onnx;
mod service;

pub use error::{ModelError, PredictError};
pub use model::{load_model, Model, ModelKind, Models};
pub use service::{predict, predict_rows, PredictionResult};
