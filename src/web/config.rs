use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    pub models: ModelsConfig,
    pub history: HistoryConfig,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub compat: CompatConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub soc: PathBuf,
    pub soh: PathBuf,
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

fn default_intra_threads() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub data_folder: PathBuf,
}

/// Fixed-window request ceiling per client address.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub window: Duration,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompatConfig {
    /// Label SOH predictions from a request body as `predicted_soc`, like the
    /// first version of the API did.
    #[serde(default)]
    pub legacy_soh_response_key: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryConfig {
    /// Export spans over OTLP; endpoint and headers come from `OTEL_*` env vars
    #[serde(default)]
    pub otlp_export: bool,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.models.intra_threads == 0 {
            return Err(ConfigError::Invalid(
                "models.intra_threads must be at least 1".into(),
            ));
        }
        if let Some(limit) = &self.rate_limit {
            if limit.requests == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.requests must be at least 1".into(),
                ));
            }
            if limit.window.is_zero() {
                return Err(ConfigError::Invalid(
                    "rate_limit.window must be non-zero".into(),
                ));
            }
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
models:
  soc: models/SOC_LSTM.onnx
  soh: models/SOH_LSTM.onnx
history:
  data_folder: battery_datas
";

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_str(MINIMAL).unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8000");
        assert_eq!(config.models.intra_threads, 1);
        assert!(config.rate_limit.is_none());
        assert!(!config.metrics.enabled);
        assert!(!config.compat.legacy_soh_response_key);
        assert!(!config.telemetry.otlp_export);
    }

    #[test]
    fn telemetry_section_enables_export() {
        let yaml = format!("{MINIMAL}telemetry:\n  otlp_export: true\n");
        let config = Config::from_str(&yaml).unwrap();
        assert!(config.telemetry.otlp_export);
    }

    #[test]
    fn rate_limit_window_is_a_human_duration() {
        let yaml = format!("{MINIMAL}rate_limit:\n  requests: 5\n  window: 1m\n");
        let config = Config::from_str(&yaml).unwrap();
        let limit = config.rate_limit.unwrap();
        assert_eq!(limit.requests, 5);
        assert_eq!(limit.window, Duration::from_secs(60));
    }

    #[test]
    fn zero_request_limit_is_rejected() {
        let yaml = format!("{MINIMAL}rate_limit:\n  requests: 0\n  window: 1m\n");
        assert!(matches!(
            Config::from_str(&yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn bad_duration_is_a_parse_error() {
        let yaml = format!("{MINIMAL}rate_limit:\n  requests: 5\n  window: soon\n");
        assert!(matches!(Config::from_str(&yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn parses_through_from_str_trait() {
        let config: Config = MINIMAL.parse().unwrap();
        assert_eq!(config.history.data_folder, PathBuf::from("battery_datas"));
    }

    #[test]
    fn missing_models_section_fails() {
        assert!(Config::from_str("history:\n  data_folder: x\n").is_err());
    }
}
