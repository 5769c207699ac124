use axum::{
    extract::{Query, State},
    http::{
        StatusCode,
        header::{self, HeaderValue},
    },
    response::Response,
};
use std::io;
use tokio_stream::wrappers::ReceiverStream;

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::{self, CsvExporter};

use super::cache;
use super::filters::FilterQuery;

/// Rows serialized per streamed chunk
const EXPORT_CHUNK_ROWS: usize = 1000;

const EXPORT_FILENAME: &str = "attachment; filename=\"smart_home_filtered.csv\"";

/// Download the filtered readings as CSV
///
/// Columns follow the input file, followed by the derived `Date`, `Hour` and
/// `Total_Energy_kWh`. A selection with no matches yields only the header row.
#[utoipa::path(
    get,
    path = "/api/export",
    params(FilterQuery),
    responses(
        (status = 200, description = "CSV stream", body = String, content_type = "text/csv"),
        (status = 400, description = "Invalid filter parameters"),
        (status = 503, description = "Too many concurrent exports"),
    ),
    tag = "export"
)]
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Response> {
    let permit = state
        .export_permits
        .clone()
        .try_acquire_owned()
        .map_err(|_| {
            tracing::warn!(
                status = StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                "export_request_rejected"
            );
            AppError::ServiceUnavailable(
                "Too many concurrent exports. Please try again later.".to_string(),
            )
        })?;

    let dataset = cache::load_dataset(&state, &query.source(&state)).await?;
    let criteria = query.criteria(&dataset)?;

    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Vec<u8>, io::Error>>(16);

    tokio::spawn(async move {
        // Held until the last chunk is sent
        let _permit = permit;
        let exporter = CsvExporter::new(&dataset);

        if tx.send(exporter.header_bytes().map_err(io::Error::other)).await.is_err() {
            return;
        }

        let outcome = pipeline::filter(&dataset, &criteria);
        let Some(view) = outcome.view() else {
            return;
        };

        let mut rows_sent = 0usize;
        for chunk in view.rows().chunks(EXPORT_CHUNK_ROWS) {
            let bytes = exporter.rows_bytes(chunk).map_err(io::Error::other);
            let failed = bytes.is_err();
            if tx.send(bytes).await.is_err() || failed {
                tracing::debug!(rows_sent, "export_aborted");
                return;
            }
            rows_sent += chunk.len();
        }
        tracing::debug!(rows_sent, "export_completed");
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);

    Response::builder()
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/csv; charset=utf-8"),
        )
        .header(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static(EXPORT_FILENAME),
        )
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}
