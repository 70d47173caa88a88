use axum::{
    extract::{Path, State},
    http::Uri,
    Json,
};

use crate::history::DischargeRecord;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/data/{battery_id}",
    tag = "history",
    params(
        ("battery_id" = String, Path, description = "Battery number, e.g. `05` for B0005")
    ),
    responses(
        (status = 200, description = "Discharge rows sorted by time", body = Vec<Object>),
        (status = 404, description = "No data file for this battery", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Data file unreadable", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "get-battery-data", skip_all, fields(battery_id = %battery_id, http.endpoint = %uri))]
pub async fn get_battery_data(
    State(state): State<AppState>,
    Path(battery_id): Path<String>,
    uri: Uri,
) -> ApiResult<Json<Vec<DischargeRecord>>> {
    let rows = state.history.load(&battery_id)?;
    Ok(Json(rows))
}
