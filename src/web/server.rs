use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::history::HistoryStore;
use crate::inference::Models;

use super::api::history as history_handlers;
use super::api::predict as predict_handlers;
use super::api::status as status_handlers;
use super::api_doc::ApiDoc;
use super::config::{Config, RateLimitConfig};
use super::metrics;
use super::rate_limit::{self, RateLimiter};
use super::state::AppState;

pub fn build_router(
    state: AppState,
    limits: Option<&RateLimitConfig>,
    metrics_enabled: bool,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes that run inference or touch the data folder
    let mut limited = Router::new()
        .route(
            "/predict-soc/",
            get(predict_handlers::predict_soc).post(predict_handlers::predict_soc),
        )
        .route("/soc-test-predict/", get(predict_handlers::soc_test_predict))
        .route(
            "/predict-soh/",
            get(predict_handlers::predict_soh).post(predict_handlers::predict_soh),
        )
        .route("/soh-test-predict/", get(predict_handlers::soh_test_predict))
        .route(
            "/api/data/{battery_id}",
            get(history_handlers::get_battery_data),
        );

    if let Some(config) = limits {
        log::info!(
            "Rate limiting to {} request(s) per {} per client",
            config.requests,
            humantime::format_duration(config.window)
        );
        let limiter = Arc::new(RateLimiter::new(config));
        limited = limited.route_layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::enforce,
        ));
    }

    let app = Router::new()
        .route("/", get(status_handlers::index))
        .route("/health", get(status_handlers::health))
        .route("/items/{item_id}", get(status_handlers::read_item))
        .merge(limited)
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if metrics_enabled {
        metrics::install(app)
    } else {
        app
    }
}

pub async fn run_server(config: Config, models: Models) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let state = AppState::new(
        models,
        HistoryStore::new(config.history.data_folder.clone()),
        config.compat.clone(),
    );

    let app = build_router(state, config.rate_limit.as_ref(), config.metrics.enabled);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
