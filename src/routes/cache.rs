//! Dataset memoization at the ingestion boundary.
//!
//! Only normalized datasets are cached. Filter results are recomputed on
//! every request.
//!
//! | Source | On miss |
//! |--------|---------|
//! | `File(path)` | Re-ingest the file from disk |
//! | `Upload(id)` | 404, the client must upload again |
//!
//! Both kinds expire after `CACHE_TTL_SECONDS` (one hour by default).

use axum::body::Bytes;
use std::io;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::{AppState, DatasetSource};
use crate::error::{AppError, AppResult};
use crate::pipeline::{self, Dataset, IngestError};

/// Fetch a normalized dataset, ingesting it if it is a file that is not cached.
///
/// Concurrent misses on the same file share a single ingestion.
///
/// # Errors
///
/// Returns `AppError::NotFound` for unknown or expired uploads and
/// `AppError::Ingest` when the file cannot be ingested.
pub async fn load_dataset(state: &AppState, source: &DatasetSource) -> AppResult<Arc<Dataset>> {
    if let Some(dataset) = state.datasets.get(source).await {
        tracing::debug!(source = %source, "cache_hit");
        return Ok(dataset);
    }

    let path = match source {
        DatasetSource::File(path) => path.clone(),
        DatasetSource::Upload(id) => {
            return Err(AppError::NotFound(format!(
                "Dataset '{id}' not found or expired. Upload it again."
            )));
        }
    };

    tracing::debug!(source = %source, "cache_miss");
    let options = state.config.ingest_options();
    let label = source.to_string();
    let dataset = state
        .datasets
        .try_get_with(source.clone(), async move {
            let dataset =
                tokio::task::spawn_blocking(move || pipeline::ingest_path(&path, &options))
                    .await
                    .map_err(|e| IngestError::Io(io::Error::other(e)))??;
            tracing::info!(source = %label, rows = dataset.len(), "dataset_cached");
            Ok::<_, IngestError>(Arc::new(dataset))
        })
        .await?;

    Ok(dataset)
}

/// Ingest uploaded CSV bytes and cache them under a fresh upload id.
///
/// # Errors
///
/// Returns `AppError::Ingest` when the upload is missing a required column
/// or is not readable as CSV.
pub async fn store_upload(state: &AppState, body: Bytes) -> AppResult<(Uuid, Arc<Dataset>)> {
    let options = state.config.ingest_options();
    let dataset = tokio::task::spawn_blocking(move || pipeline::ingest_csv(&body[..], &options))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let id = Uuid::new_v4();
    let dataset = Arc::new(dataset);
    store_dataset(state, DatasetSource::Upload(id), dataset.clone()).await;
    Ok((id, dataset))
}

pub async fn store_dataset(state: &AppState, source: DatasetSource, dataset: Arc<Dataset>) {
    let rows = dataset.len();
    state.datasets.insert(source.clone(), dataset).await;

    tracing::info!(
        source = %source,
        rows,
        "dataset_cached"
    );
}

/// Drop a cached dataset. Returns whether an entry was present.
pub async fn invalidate(state: &AppState, source: &DatasetSource) -> bool {
    let removed = state.datasets.remove(source).await.is_some();
    tracing::debug!(source = %source, removed, "cache_invalidated");
    removed
}
