use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_AMBIENT_TEMPERATURE: f64 = 24.0;
pub const DEFAULT_RUL: i64 = 167;

/// One observed instant of battery telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeStepSample {
    pub voltage_measured: f64,
    pub current_measured: f64,
    pub temperature_measured: f64,
    pub current_load: f64,
    pub voltage_load: f64,
    pub time: f64,
}

/// Body of the prediction endpoints.
///
/// `ambient_temperature` and `rul` are request-level scalars that get
/// broadcast onto every timestep row of the model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionRequest {
    #[serde(default = "default_ambient_temperature")]
    #[schema(default = 24.0)]
    pub ambient_temperature: f64,
    /// Remaining useful life hint, fed to the model as a static feature
    #[serde(default = "default_rul", deserialize_with = "deserialize_rul")]
    #[schema(default = 167)]
    pub rul: i64,
    pub time_steps: Vec<TimeStepSample>,
}

fn default_ambient_temperature() -> f64 {
    DEFAULT_AMBIENT_TEMPERATURE
}

fn default_rul() -> i64 {
    DEFAULT_RUL
}

/// Accept `167` and `167.0` alike, but not a fractional value.
fn deserialize_rul<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(v) => Ok(v),
        Number::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        Number::Float(v) => Err(serde::de::Error::custom(format!(
            "rul must be a whole number, got {v}"
        ))),
    }
}

impl PredictionRequest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
