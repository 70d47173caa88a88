use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::predict::PredictionResponse;
use super::api::status::{HealthResponse, IndexResponse, ItemResponse};
use crate::battery::{PredictionRequest, TimeStepSample};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::status::health,
        super::api::status::index,
        super::api::status::read_item,
        super::api::predict::predict_soc,
        super::api::predict::soc_test_predict,
        super::api::predict::predict_soh,
        super::api::predict::soh_test_predict,
        super::api::history::get_battery_data,
    ),
    components(
        schemas(
            PredictionRequest,
            TimeStepSample,
            PredictionResponse,
            HealthResponse,
            IndexResponse,
            ItemResponse,
            ErrorResponse,
        )
    ),
    info(
        title = "Battery Predictor API",
        description = "State-of-charge and state-of-health predictions from battery telemetry",
        version = "0.1.0"
    ),
    tags(
        (name = "predict", description = "SOC and SOH predictions"),
        (name = "history", description = "Battery discharge history"),
        (name = "status", description = "Service status")
    )
)]
pub struct ApiDoc;
