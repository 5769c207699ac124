use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::{AppState, DatasetSource};
use crate::error::{AppError, AppResult};
use crate::pipeline::DatasetSummary;

use super::cache;

#[derive(Debug, Serialize, ToSchema)]
pub struct DatasetResponse {
    /// Upload id, null for the configured file
    pub id: Option<Uuid>,
    pub source: String,
    #[serde(flatten)]
    pub summary: DatasetSummary,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DatasetQuery {
    /// Uploaded dataset id. Uses the configured file when omitted.
    pub dataset: Option<Uuid>,
}

impl DatasetQuery {
    fn source(&self, state: &AppState) -> DatasetSource {
        self.dataset
            .map_or_else(|| state.default_source(), DatasetSource::Upload)
    }
}

/// Describe a dataset
///
/// Row counts, covered dates, rooms and the energy columns found at ingestion.
#[utoipa::path(
    get,
    path = "/api/dataset",
    params(DatasetQuery),
    responses(
        (status = 200, description = "Dataset loaded", body = DatasetResponse),
        (status = 404, description = "No dataset file, or upload expired"),
        (status = 422, description = "Dataset is missing a required column"),
    ),
    tag = "datasets"
)]
pub async fn get_dataset(
    State(state): State<AppState>,
    Query(query): Query<DatasetQuery>,
) -> AppResult<Json<DatasetResponse>> {
    let source = query.source(&state);
    let dataset = cache::load_dataset(&state, &source).await?;

    Ok(Json(DatasetResponse {
        id: query.dataset,
        source: source.to_string(),
        summary: dataset.summary(),
    }))
}

/// Upload a CSV dataset
///
/// The request body is the raw CSV. The returned id selects this dataset
/// on every data endpoint until it expires from the cache.
#[utoipa::path(
    post,
    path = "/api/datasets",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 201, description = "Dataset ingested", body = DatasetResponse),
        (status = 413, description = "Upload exceeds UPLOAD_MAX_BYTES"),
        (status = 422, description = "Dataset is missing a required column"),
    ),
    tag = "datasets"
)]
pub async fn upload_dataset(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DatasetResponse>)> {
    if body.is_empty() {
        return Err(AppError::BadRequest("request body is empty".to_string()));
    }

    let size_bytes = body.len();
    let (id, dataset) = cache::store_upload(&state, body).await?;
    let summary = dataset.summary();
    tracing::info!(
        dataset_id = %id,
        size_bytes,
        rows_loaded = summary.rows_loaded,
        rows_dropped = summary.rows_dropped,
        "Dataset uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DatasetResponse {
            id: Some(id),
            source: DatasetSource::Upload(id).to_string(),
            summary,
        }),
    ))
}

/// Discard an uploaded dataset
#[utoipa::path(
    delete,
    path = "/api/datasets/{dataset_id}",
    params(
        ("dataset_id" = Uuid, Path, description = "Upload id"),
    ),
    responses(
        (status = 204, description = "Dataset removed"),
        (status = 404, description = "Dataset not found or expired"),
    ),
    tag = "datasets"
)]
pub async fn delete_dataset(
    State(state): State<AppState>,
    Path(dataset_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if cache::invalidate(&state, &DatasetSource::Upload(dataset_id)).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "Dataset '{dataset_id}' not found or expired"
        )))
    }
}

/// List rooms
///
/// Sorted room labels, for the room selector.
#[utoipa::path(
    get,
    path = "/api/rooms",
    params(DatasetQuery),
    responses(
        (status = 200, description = "Rooms retrieved successfully", body = Vec<String>),
    ),
    tag = "datasets"
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<DatasetQuery>,
) -> AppResult<Json<Vec<String>>> {
    let dataset = cache::load_dataset(&state, &query.source(&state)).await?;
    Ok(Json(dataset.rooms()))
}
