use axum::{extract::rejection::JsonRejection, extract::State, http::Uri, Json};
use serde::Serialize;
use std::time::Instant;
use utoipa::ToSchema;

use crate::battery::demo::{SOC_DEMO_ROWS, SOH_DEMO_ROWS};
use crate::battery::PredictionRequest;
use crate::inference::{predict, predict_rows, ModelKind, PredictError, PredictionResult};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::metrics::record_prediction;
use crate::web::state::AppState;

/// `{"predicted_soc": x}` or `{"predicted_soh": x}`, with the request echoed
/// under `input_data` when the prediction came from a request body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum PredictionResponse {
    Soc {
        predicted_soc: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        input_data: Option<PredictionRequest>,
    },
    Soh {
        predicted_soh: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        input_data: Option<PredictionRequest>,
    },
}

impl PredictionResponse {
    pub fn new(result: PredictionResult, legacy_soh_key: bool) -> Self {
        let PredictionResult { kind, value, input } = result;
        match kind {
            ModelKind::Soh if !legacy_soh_key => PredictionResponse::Soh {
                predicted_soh: value,
                input_data: input,
            },
            _ => PredictionResponse::Soc {
                predicted_soc: value,
                input_data: input,
            },
        }
    }
}

#[utoipa::path(
    get,
    path = "/predict-soc/",
    tag = "predict",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "SOC estimate with echoed input", body = PredictionResponse),
        (status = 400, description = "Invalid request or inference failure", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "predict-soc", skip_all, fields(http.endpoint = %uri))]
pub async fn predict_soc(
    State(state): State<AppState>,
    uri: Uri,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> ApiResult<Json<PredictionResponse>> {
    let Json(request) = payload?;
    predict_from_body(&state, ModelKind::Soc, request)
}

#[utoipa::path(
    get,
    path = "/predict-soh/",
    tag = "predict",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "SOH estimate with echoed input", body = PredictionResponse),
        (status = 400, description = "Invalid request or inference failure", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "predict-soh", skip_all, fields(http.endpoint = %uri))]
pub async fn predict_soh(
    State(state): State<AppState>,
    uri: Uri,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> ApiResult<Json<PredictionResponse>> {
    let Json(request) = payload?;
    predict_from_body(&state, ModelKind::Soh, request)
}

#[utoipa::path(
    get,
    path = "/soc-test-predict/",
    tag = "predict",
    responses(
        (status = 200, description = "SOC estimate for the built-in discharge window", body = PredictionResponse),
        (status = 400, description = "Inference failure", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "soc-test-predict", skip_all, fields(http.endpoint = %uri))]
pub async fn soc_test_predict(
    State(state): State<AppState>,
    uri: Uri,
) -> ApiResult<Json<PredictionResponse>> {
    predict_demo(&state, ModelKind::Soc)
}

#[utoipa::path(
    get,
    path = "/soh-test-predict/",
    tag = "predict",
    responses(
        (status = 200, description = "SOH estimate for the built-in discharge window", body = PredictionResponse),
        (status = 400, description = "Inference failure", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "soh-test-predict", skip_all, fields(http.endpoint = %uri))]
pub async fn soh_test_predict(
    State(state): State<AppState>,
    uri: Uri,
) -> ApiResult<Json<PredictionResponse>> {
    predict_demo(&state, ModelKind::Soh)
}

fn predict_from_body(
    state: &AppState,
    kind: ModelKind,
    request: PredictionRequest,
) -> ApiResult<Json<PredictionResponse>> {
    let value = observe(kind, || predict(&request, state.models.get(kind)))?;
    let result = PredictionResult {
        kind,
        value,
        input: Some(request),
    };
    Ok(Json(PredictionResponse::new(
        result,
        state.compat.legacy_soh_response_key,
    )))
}

fn predict_demo(state: &AppState, kind: ModelKind) -> ApiResult<Json<PredictionResponse>> {
    let rows = match kind {
        ModelKind::Soc => &SOC_DEMO_ROWS,
        ModelKind::Soh => &SOH_DEMO_ROWS,
    };
    let value = observe(kind, || predict_rows(rows, state.models.get(kind)))?;
    let result = PredictionResult {
        kind,
        value,
        input: None,
    };
    Ok(Json(PredictionResponse::new(result, false)))
}

fn observe(
    kind: ModelKind,
    run: impl FnOnce() -> Result<f32, PredictError>,
) -> Result<f32, ApiError> {
    let started = Instant::now();
    let outcome = run();
    record_prediction(kind, started.elapsed(), outcome.is_ok());

    outcome.map_err(|e| {
        log::warn!("{} prediction rejected: {}", kind, e);
        ApiError::from(e)
    })
}
