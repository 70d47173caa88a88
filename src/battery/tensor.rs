use ndarray::{Array3, ArrayView2};

use crate::battery::error::ShapeError;
use crate::battery::types::{PredictionRequest, TimeStepSample};

/// Timestep dimension the models were trained on.
pub const TIMESTEPS: usize = 10;
/// Features per timestep row.
pub const FEATURES: usize = 8;

/// Column order of a model input row. Must match training.
pub const FEATURE_NAMES: [&str; FEATURES] = [
    "ambient_temperature",
    "voltage_measured",
    "current_measured",
    "temperature_measured",
    "current_load",
    "voltage_load",
    "time",
    "rul",
];

pub type FeatureRow = [f32; FEATURES];

/// Model input of shape (1, TIMESTEPS, FEATURES).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTensor {
    data: Array3<f32>,
}

impl FeatureTensor {
    /// Assemble the model input from a request, rejecting any sequence that is
    /// not exactly `TIMESTEPS` long.
    pub fn from_request(request: &PredictionRequest) -> Result<Self, ShapeError> {
        let rows: Vec<FeatureRow> = request
            .time_steps
            .iter()
            .map(|sample| feature_row(request.ambient_temperature, request.rul, sample))
            .collect();
        Self::from_rows(&rows)
    }

    pub fn from_rows(rows: &[FeatureRow]) -> Result<Self, ShapeError> {
        if rows.len() != TIMESTEPS {
            return Err(ShapeError::TimeSteps {
                expected: TIMESTEPS,
                actual: rows.len(),
            });
        }

        let mut data = Array3::<f32>::zeros((1, TIMESTEPS, FEATURES));
        for (t, row) in rows.iter().enumerate() {
            for (f, value) in row.iter().enumerate() {
                data[[0, t, f]] = *value;
            }
        }

        Ok(Self { data })
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// The single batch element as a (TIMESTEPS, FEATURES) view.
    pub fn rows(&self) -> ArrayView2<'_, f32> {
        self.data.index_axis(ndarray::Axis(0), 0)
    }

    #[cfg_attr(not(feature = "onnx"), allow(dead_code))]
    pub fn as_array(&self) -> &Array3<f32> {
        &self.data
    }
}

fn feature_row(ambient_temperature: f64, rul: i64, sample: &TimeStepSample) -> FeatureRow {
    [
        ambient_temperature as f32,
        sample.voltage_measured as f32,
        sample.current_measured as f32,
        sample.temperature_measured as f32,
        sample.current_load as f32,
        sample.voltage_load as f32,
        sample.time as f32,
        rul as f32,
    ]
}
