use std::path::Path;
use std::sync::Arc;
use strum_macros::{Display, IntoStaticStr};

use crate::battery::FeatureTensor;
use crate::inference::error::ModelError;

/// A loaded sequence model. Implementations must tolerate concurrent calls.
pub trait Model: Send + Sync {
    /// Run the model on a (1, 10, 8) input and return its flattened output.
    fn infer(&self, input: &FeatureTensor) -> Result<Vec<f32>, ModelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, clap::ValueEnum)]
#[strum(serialize_all = "snake_case")]
pub enum ModelKind {
    Soc,
    Soh,
}

/// The SOC and SOH handles, loaded once at startup and shared read-only.
#[derive(Clone)]
pub struct Models {
    pub soc: Arc<dyn Model>,
    pub soh: Arc<dyn Model>,
}

impl Models {
    pub fn new(soc: Arc<dyn Model>, soh: Arc<dyn Model>) -> Self {
        Self { soc, soh }
    }

    pub fn get(&self, kind: ModelKind) -> &dyn Model {
        match kind {
            ModelKind::Soc => self.soc.as_ref(),
            ModelKind::Soh => self.soh.as_ref(),
        }
    }
}

#[cfg(feature = "onnx")]
pub fn load_model(path: &Path, intra_threads: usize) -> Result<Arc<dyn Model>, ModelError> {
    let model = crate::inference::onnx::OnnxModel::load(path, intra_threads)?;
    Ok(Arc::new(model))
}

#[cfg(not(feature = "onnx"))]
pub fn load_model(path: &Path, _intra_threads: usize) -> Result<Arc<dyn Model>, ModelError> {
    Err(ModelError::BackendUnavailable(path.display().to_string()))
}
