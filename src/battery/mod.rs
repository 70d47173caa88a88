pub mod demo;
mod error;
mod tensor;
mod types;

pub use error::ShapeError;
pub use tensor::{FeatureRow, FeatureTensor, FEATURE_NAMES};
pub use types::{PredictionRequest, TimeStepSample};
