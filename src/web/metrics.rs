use axum::{routing::get, Router};
use axum_prometheus::PrometheusMetricLayer;
use std::time::Duration;

use crate::inference::ModelKind;

/// Count one prediction attempt and its inference latency.
///
/// Without an installed recorder these calls are no-ops.
pub fn record_prediction(kind: ModelKind, elapsed: Duration, ok: bool) {
    let model: &'static str = kind.into();
    let outcome = if ok { "ok" } else { "error" };

    metrics::counter!("battery_predictions_total", "model" => model, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("battery_inference_duration_seconds", "model" => model)
        .record(elapsed.as_secs_f64());
}

/// Install the global Prometheus recorder, add per-route request metrics and
/// expose them at `/metrics`. Call at most once per process.
pub fn install(router: Router) -> Router {
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    router
        .route("/metrics", get(move || async move { metric_handle.render() }))
        .layer(prometheus_layer)
}
