use crate::battery::{FeatureRow, FeatureTensor, PredictionRequest};
use crate::inference::error::{ModelError, PredictError};
use crate::inference::{Model, ModelKind};

/// A single model estimate, labelled by the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub kind: ModelKind,
    pub value: f32,
    /// Request that produced the estimate, kept for echoing back
    pub input: Option<PredictionRequest>,
}

/// Validate the request shape, assemble the (1, 10, 8) tensor and run the model.
///
/// The model is never invoked for a request with the wrong number of time steps.
pub fn predict(request: &PredictionRequest, model: &dyn Model) -> Result<f32, PredictError> {
    let tensor = FeatureTensor::from_request(request)?;
    infer_scalar(&tensor, model)
}

/// Same path as [`predict`], for pre-assembled rows such as the demo tables.
pub fn predict_rows(rows: &[FeatureRow], model: &dyn Model) -> Result<f32, PredictError> {
    let tensor = FeatureTensor::from_rows(rows)?;
    infer_scalar(&tensor, model)
}

fn infer_scalar(tensor: &FeatureTensor, model: &dyn Model) -> Result<f32, PredictError> {
    let output = model.infer(tensor)?;
    // batch of one, one output unit
    let value = output.first().copied().ok_or(ModelError::EmptyOutput)?;
    if !value.is_finite() {
        return Err(ModelError::NonFinite(value).into());
    }
    Ok(value)
}
