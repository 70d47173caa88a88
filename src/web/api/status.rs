use axum::{
    extract::{Path, Query},
    http::Uri,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndexResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    pub item_id: i64,
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "status",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
#[tracing::instrument(name = "health-check", skip_all, fields(http.endpoint = %uri))]
pub async fn health(uri: Uri) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "status",
    responses(
        (status = 200, description = "Greeting", body = IndexResponse)
    )
)]
#[tracing::instrument(name = "api-index", skip_all, fields(http.endpoint = %uri))]
pub async fn index(uri: Uri) -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Hello from battery-predictor!".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/items/{item_id}",
    tag = "status",
    params(
        ("item_id" = i64, Path, description = "Item identifier"),
        ("q" = Option<String>, Query, description = "Free-form query value")
    ),
    responses(
        (status = 200, description = "Echo of the supplied values", body = ItemResponse)
    )
)]
#[tracing::instrument(name = "read-item", skip_all, fields(item_id = item_id, http.endpoint = %uri))]
pub async fn read_item(
    Path(item_id): Path<i64>,
    Query(query): Query<ItemQuery>,
    uri: Uri,
) -> Json<ItemResponse> {
    Json(ItemResponse {
        item_id,
        q: query.q,
    })
}
