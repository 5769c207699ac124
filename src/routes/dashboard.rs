use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::error::AppResult;
use crate::pipeline::{
    self, ComfortTrend, ElectricityRate, EnergyPoint, Metrics, MotionPivot, MotionState, Reading,
    RoomStats, reading::round2,
};

use super::cache;
use super::filters::{AppliedFilters, FilterQuery, NO_MATCHES_MESSAGE, ViewStatus};

/// One row of the latest-readings table, rounded for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LatestReading {
    pub timestamp: NaiveDateTime,
    pub home_id: String,
    pub room: String,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub light_lux: Option<f64>,
    pub total_energy_kwh: f64,
    pub motion_state: Option<MotionState>,
}

impl From<&Reading> for LatestReading {
    fn from(r: &Reading) -> Self {
        Self {
            timestamp: r.timestamp,
            home_id: r.home_id.clone(),
            room: r.room.clone(),
            temperature_c: r.temperature_c.map(round2),
            humidity_pct: r.humidity_pct.map(round2),
            light_lux: r.light_lux.map(round2),
            total_energy_kwh: round2(r.total_energy_kwh),
            motion_state: r.motion_state,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub status: ViewStatus,
    /// User-facing note, set when no readings match
    pub message: Option<String>,
    pub filters: AppliedFilters,
    /// Electricity rate after clamping
    pub rate_per_kwh: f64,
    pub metrics: Option<Metrics>,
    pub estimated_cost: Option<f64>,
    pub motion_pivot: Option<MotionPivot>,
    /// Newest first
    pub latest: Vec<LatestReading>,
    pub rooms: Vec<RoomStats>,
    pub energy_trend: Vec<EnergyPoint>,
    pub comfort_trend: Option<ComfortTrend>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LatestReadingsResponse {
    pub status: ViewStatus,
    pub message: Option<String>,
    pub filters: AppliedFilters,
    /// Newest first
    pub readings: Vec<LatestReading>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MotionPivotResponse {
    pub status: ViewStatus,
    pub message: Option<String>,
    pub filters: AppliedFilters,
    pub pivot: Option<MotionPivot>,
}

/// Get every dashboard widget for a filter selection
///
/// Computes metrics, estimated cost, the hour-by-room motion table, latest
/// readings, per-room statistics and trend series in one pass over the
/// filtered readings. When nothing matches, `status` is `no_matches` and
/// the widget fields are empty.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    params(FilterQuery),
    responses(
        (status = 200, description = "Dashboard computed", body = DashboardResponse),
        (status = 400, description = "Invalid filter parameters"),
        (status = 404, description = "No dataset file, or upload expired"),
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<DashboardResponse>> {
    let dataset = cache::load_dataset(&state, &query.source(&state)).await?;
    let criteria = query.criteria(&dataset)?;
    let limit = query.latest_limit(&state)?;
    let rate = ElectricityRate::clamped(query.rate, &state.config.rate_bounds());

    let filters = AppliedFilters::from(&criteria);
    let outcome = pipeline::filter(&dataset, &criteria);
    let Some(view) = outcome.view() else {
        tracing::debug!(filters = ?filters, "dashboard_no_matches");
        return Ok(Json(DashboardResponse {
            status: ViewStatus::NoMatches,
            message: Some(NO_MATCHES_MESSAGE.to_string()),
            filters,
            rate_per_kwh: rate.per_kwh(),
            metrics: None,
            estimated_cost: None,
            motion_pivot: None,
            latest: vec![],
            rooms: vec![],
            energy_trend: vec![],
            comfort_trend: None,
        }));
    };

    let metrics = pipeline::summarize(view);
    tracing::debug!(
        rows = metrics.reading_count,
        total_energy_kwh = metrics.total_energy_kwh,
        "dashboard_computed"
    );

    Ok(Json(DashboardResponse {
        status: ViewStatus::Ok,
        message: None,
        filters,
        rate_per_kwh: rate.per_kwh(),
        estimated_cost: Some(metrics.estimated_cost(rate)),
        metrics: Some(metrics),
        motion_pivot: Some(pipeline::motion_pivot(view)),
        latest: pipeline::latest_n(view, limit)
            .into_iter()
            .map(LatestReading::from)
            .collect(),
        rooms: pipeline::room_breakdown(view),
        energy_trend: pipeline::energy_trend(view),
        comfort_trend: Some(pipeline::comfort_trend(view)),
    }))
}

/// Get the latest readings for a filter selection
#[utoipa::path(
    get,
    path = "/api/readings/latest",
    params(FilterQuery),
    responses(
        (status = 200, description = "Latest readings, newest first", body = LatestReadingsResponse),
        (status = 400, description = "Invalid filter parameters"),
    ),
    tag = "dashboard"
)]
pub async fn get_latest_readings(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<LatestReadingsResponse>> {
    let dataset = cache::load_dataset(&state, &query.source(&state)).await?;
    let criteria = query.criteria(&dataset)?;
    let limit = query.latest_limit(&state)?;

    let outcome = pipeline::filter(&dataset, &criteria);
    let readings: Vec<LatestReading> = outcome
        .view()
        .map(|view| {
            pipeline::latest_n(view, limit)
                .into_iter()
                .map(LatestReading::from)
                .collect()
        })
        .unwrap_or_default();

    let (status, message) = status_of(outcome.view().is_some());
    Ok(Json(LatestReadingsResponse {
        status,
        message,
        filters: AppliedFilters::from(&criteria),
        readings,
    }))
}

/// Get motion activity by hour of day and room
///
/// Counts Active motion readings for every hour 0-23 and every room in the
/// filtered data. Empty cells are explicit zeros.
#[utoipa::path(
    get,
    path = "/api/motion-pivot",
    params(FilterQuery),
    responses(
        (status = 200, description = "Motion pivot computed", body = MotionPivotResponse),
        (status = 400, description = "Invalid filter parameters"),
    ),
    tag = "dashboard"
)]
pub async fn get_motion_pivot(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<MotionPivotResponse>> {
    let dataset = cache::load_dataset(&state, &query.source(&state)).await?;
    let criteria = query.criteria(&dataset)?;

    let pivot = pipeline::filter(&dataset, &criteria)
        .view()
        .map(pipeline::motion_pivot);

    let (status, message) = status_of(pivot.is_some());
    Ok(Json(MotionPivotResponse {
        status,
        message,
        filters: AppliedFilters::from(&criteria),
        pivot,
    }))
}

fn status_of(matched: bool) -> (ViewStatus, Option<String>) {
    if matched {
        (ViewStatus::Ok, None)
    } else {
        (ViewStatus::NoMatches, Some(NO_MATCHES_MESSAGE.to_string()))
    }
}
