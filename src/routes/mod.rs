pub mod cache;
pub mod dashboard;
pub mod datasets;
pub mod export;
pub mod filters;
pub mod health;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        datasets::get_dataset,
        datasets::upload_dataset,
        datasets::delete_dataset,
        datasets::list_rooms,
        dashboard::get_dashboard,
        dashboard::get_latest_readings,
        dashboard::get_motion_pivot,
        export::export_csv,
    ),
    components(
        schemas(
            health::HealthResponse,
            datasets::DatasetResponse,
            dashboard::DashboardResponse,
            dashboard::LatestReadingsResponse,
            dashboard::MotionPivotResponse,
            dashboard::LatestReading,
            filters::AppliedFilters,
            filters::ViewStatus,
            crate::pipeline::DatasetSummary,
            crate::pipeline::Metrics,
            crate::pipeline::MotionPivot,
            crate::pipeline::RoomStats,
            crate::pipeline::Distribution,
            crate::pipeline::EnergyPoint,
            crate::pipeline::ComfortTrend,
            crate::pipeline::MotionFilter,
            crate::pipeline::MotionState,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "datasets", description = "Dataset loading, uploads and rooms"),
        (name = "dashboard", description = "Filtered metrics, motion pivot and latest readings"),
        (name = "export", description = "CSV export of filtered readings"),
    ),
    info(
        title = "Home Monitor API",
        description = "Smart home energy and environment monitor over CSV sensor exports",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    // Uploads get their own, larger body limit
    let upload_routes = Router::new()
        .route("/datasets", post(datasets::upload_dataset))
        .layer(DefaultBodyLimit::max(config.upload_max_bytes))
        .layer(RequestBodyLimitLayer::new(config.upload_max_bytes));

    let data_routes = Router::new()
        .route("/dataset", get(datasets::get_dataset))
        .route("/datasets/{dataset_id}", delete(datasets::delete_dataset))
        .route("/rooms", get(datasets::list_rooms))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/readings/latest", get(dashboard::get_latest_readings))
        .route("/motion-pivot", get(dashboard::get_motion_pivot))
        .route("/export", get(export::export_csv))
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB body limit

    let api_routes = Router::new().merge(data_routes).merge(upload_routes);

    // Conditionally apply rate limiting
    let api_routes = if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
        api_routes
    } else {
        match GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .finish()
        {
            Some(limiter) => {
                tracing::info!(
                    rate = %format!(
                        "1 request per {}s, burst {}",
                        config.rate_limit_per_second, config.rate_limit_burst
                    ),
                    "Rate limiting configured"
                );
                api_routes.layer(GovernorLayer {
                    config: Arc::new(limiter),
                })
            }
            None => {
                tracing::warn!(
                    per_second = config.rate_limit_per_second,
                    burst = config.rate_limit_burst,
                    "Invalid rate limit settings, rate limiting DISABLED"
                );
                api_routes
            }
        }
    };

    // Health check routes (NO rate limiting)
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Combine all routes
    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
