use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::{AppState, DatasetSource};
use crate::error::{AppError, AppResult};
use crate::pipeline::{Dataset, DateRange, FilterCriteria, MotionFilter, RoomFilter};

/// Filter parameters shared by every data endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FilterQuery {
    /// Uploaded dataset id. Uses the configured file when omitted.
    pub dataset: Option<Uuid>,
    /// Room label, or "all" (default)
    pub room: Option<String>,
    /// First day to include (YYYY-MM-DD). Defaults to the first day in the data.
    pub start: Option<NaiveDate>,
    /// Last day to include (YYYY-MM-DD). Defaults to the last day in the data.
    pub end: Option<NaiveDate>,
    /// Motion state: all (default), active, inactive
    #[serde(default)]
    pub motion: MotionFilter,
    /// Electricity rate per kWh, clamped to the configured bounds
    pub rate: Option<f64>,
    /// Number of latest readings to return
    pub limit: Option<usize>,
}

impl FilterQuery {
    #[must_use]
    pub fn source(&self, state: &AppState) -> DatasetSource {
        self.dataset
            .map_or_else(|| state.default_source(), DatasetSource::Upload)
    }

    /// Build criteria, defaulting open date bounds to the dataset's span.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if `start` is after `end`.
    pub fn criteria(&self, dataset: &Dataset) -> AppResult<FilterCriteria> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(AppError::BadRequest(
                "start date must not be after end date".to_string(),
            ));
        }

        let span = dataset.date_span();
        let date_range = match (
            self.start.or(span.map(|s| s.start)),
            self.end.or(span.map(|s| s.end)),
        ) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        };

        Ok(FilterCriteria {
            room: RoomFilter::parse(self.room.as_deref()),
            date_range,
            motion: self.motion,
        })
    }

    /// Resolve the latest-readings limit.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the limit is zero or above the maximum.
    pub fn latest_limit(&self, state: &AppState) -> AppResult<usize> {
        let max = state.config.latest_max_limit;
        match self.limit {
            None => Ok(state.config.latest_default_limit),
            Some(n) if (1..=max).contains(&n) => Ok(n),
            Some(_) => Err(AppError::BadRequest(format!(
                "limit must be between 1 and {max}"
            ))),
        }
    }
}

/// The criteria a response was computed for, echoed back to the client.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppliedFilters {
    /// Selected room, or "all"
    pub room: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub motion: MotionFilter,
}

impl From<&FilterCriteria> for AppliedFilters {
    fn from(criteria: &FilterCriteria) -> Self {
        Self {
            room: match &criteria.room {
                RoomFilter::All => "all".to_string(),
                RoomFilter::Room(room) => room.clone(),
            },
            start: criteria.date_range.map(|r| r.start),
            end: criteria.date_range.map(|r| r.end),
            motion: criteria.motion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Ok,
    /// The filters matched no readings
    NoMatches,
}

pub const NO_MATCHES_MESSAGE: &str = "No data matches your filters. Try broadening them.";
