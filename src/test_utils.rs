//! Stub models and app state for tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};

use crate::battery::FeatureTensor;
use crate::history::HistoryStore;
use crate::inference::{Model, ModelError, Models};
use crate::web::config::{CompatConfig, RateLimitConfig};
use crate::web::server::build_router;
use crate::web::state::AppState;

pub struct FixedModel {
    output: Vec<f32>,
}

impl FixedModel {
    pub fn new(value: f32) -> Self {
        Self::with_output(vec![value])
    }

    pub fn with_output(output: Vec<f32>) -> Self {
        Self { output }
    }
}

impl Model for FixedModel {
    fn infer(&self, _input: &FeatureTensor) -> Result<Vec<f32>, ModelError> {
        Ok(self.output.clone())
    }
}

pub struct RecordingModel {
    value: f32,
    last: Mutex<Option<FeatureTensor>>,
}

impl RecordingModel {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            last: Mutex::new(None),
        }
    }

    pub fn last_input(&self) -> Option<FeatureTensor> {
        self.last.lock().unwrap().clone()
    }
}

impl Model for RecordingModel {
    fn infer(&self, input: &FeatureTensor) -> Result<Vec<f32>, ModelError> {
        *self.last.lock().unwrap() = Some(input.clone());
        Ok(vec![self.value])
    }
}

pub struct FailingModel {
    message: String,
}

impl FailingModel {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Model for FailingModel {
    fn infer(&self, _input: &FeatureTensor) -> Result<Vec<f32>, ModelError> {
        Err(ModelError::Runtime(self.message.clone()))
    }
}

pub fn stub_models(soc: f32, soh: f32) -> Models {
    Models::new(Arc::new(FixedModel::new(soc)), Arc::new(FixedModel::new(soh)))
}

pub struct TestApp {
    pub models: Models,
    pub data_folder: PathBuf,
    pub rate_limit: Option<RateLimitConfig>,
    pub compat: CompatConfig,
    pub metrics: bool,
}

impl TestApp {
    pub fn new(data_folder: impl Into<PathBuf>) -> Self {
        Self {
            models: stub_models(0.75, 0.9),
            data_folder: data_folder.into(),
            rate_limit: None,
            compat: CompatConfig::default(),
            metrics: false,
        }
    }

    pub fn with_models(mut self, models: Models) -> Self {
        self.models = models;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn with_compat(mut self, compat: CompatConfig) -> Self {
        self.compat = compat;
        self
    }

    /// Installs the global Prometheus recorder, so only one test per binary may use it.
    pub fn with_metrics(mut self) -> Self {
        self.metrics = true;
        self
    }

    pub fn server(self) -> TestServer {
        let state = AppState::new(
            self.models,
            HistoryStore::new(self.data_folder),
            self.compat,
        );
        let router = build_router(state, self.rate_limit.as_ref(), self.metrics);
        TestServer::new(router).unwrap()
    }
}

/// Collects the `http.endpoint` value of every span opened while installed.
#[derive(Clone, Default)]
pub struct EndpointRecorder {
    endpoints: Arc<Mutex<Vec<(String, String)>>>,
}

impl EndpointRecorder {
    /// `(span name, endpoint)` pairs in the order the spans were opened.
    pub fn recorded(&self) -> Vec<(String, String)> {
        self.endpoints.lock().unwrap().clone()
    }
}

impl<S: Subscriber> Layer<S> for EndpointRecorder {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut visitor = EndpointField(None);
        attrs.record(&mut visitor);
        if let Some(endpoint) = visitor.0 {
            self.endpoints
                .lock()
                .unwrap()
                .push((attrs.metadata().name().to_string(), endpoint));
        }
    }
}

struct EndpointField(Option<String>);

impl Visit for EndpointField {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "http.endpoint" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}
