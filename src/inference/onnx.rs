//! ONNX Runtime backed models.
//!
//! The Keras LSTM checkpoints are exported to ONNX offline; this module only
//! loads the exported graph and feeds it the assembled feature tensor.

use std::fmt::Display;
use std::path::Path;

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;
use parking_lot::Mutex;

use crate::battery::FeatureTensor;
use crate::inference::error::ModelError;
use crate::inference::model::Model;

pub struct OnnxModel {
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
}

impl OnnxModel {
    pub fn load(path: &Path, intra_threads: usize) -> Result<Self, ModelError> {
        let session = Session::builder()
            .map_err(|e| load_error(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(path, e))?
            .with_intra_threads(intra_threads)
            .map_err(|e| load_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| load_error(path, e))?;

        log::info!(
            "Loaded ONNX model {} ({} input(s), {} output(s))",
            path.display(),
            session.inputs.len(),
            session.outputs.len()
        );

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl Model for OnnxModel {
    fn infer(&self, input: &FeatureTensor) -> Result<Vec<f32>, ModelError> {
        let tensor = TensorRef::from_array_view(input.as_array()).map_err(runtime_error)?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(runtime_error)?;

        let output = outputs.values().next().ok_or(ModelError::EmptyOutput)?;
        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(runtime_error)?;

        Ok(data.to_vec())
    }
}

fn load_error(path: &Path, err: impl Display) -> ModelError {
    ModelError::Load {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn runtime_error(err: impl Display) -> ModelError {
    ModelError::Runtime(err.to_string())
}
