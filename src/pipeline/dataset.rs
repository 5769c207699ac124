use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use utoipa::ToSchema;

use super::filter::DateRange;
use super::reading::Reading;

/// Where an input column's value lives on a normalized [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceColumn {
    HomeId,
    DateTime,
    Temperature,
    Humidity,
    Light,
    Motion,
    Room,
    /// Index into `Reading::energy_kwh`.
    Energy(usize),
    /// Index into `Reading::extra`.
    Extra(usize),
}

/// A normalized, timestamp-ordered reading set.
///
/// Immutable once built. Handlers share it behind an `Arc` and run every
/// filter pass against the same instance.
#[derive(Debug, Clone)]
pub struct Dataset {
    readings: Vec<Reading>,
    columns: Vec<(String, SourceColumn)>,
    energy_columns: Vec<String>,
    rows_dropped: usize,
    supplied_total: bool,
}

impl Dataset {
    /// Build a dataset from readings. Readings are stably sorted by timestamp.
    #[must_use]
    pub fn new(
        mut readings: Vec<Reading>,
        columns: Vec<(String, SourceColumn)>,
        energy_columns: Vec<String>,
        rows_dropped: usize,
        supplied_total: bool,
    ) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self {
            readings,
            columns,
            energy_columns,
            rows_dropped,
            supplied_total,
        }
    }

    #[must_use]
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Input columns in file order, minus the ones the export derives itself.
    #[must_use]
    pub fn columns(&self) -> &[(String, SourceColumn)] {
        &self.columns
    }

    #[must_use]
    pub fn energy_columns(&self) -> &[String] {
        &self.energy_columns
    }

    #[must_use]
    pub fn rows_dropped(&self) -> usize {
        self.rows_dropped
    }

    /// Distinct room labels, sorted.
    #[must_use]
    pub fn rooms(&self) -> Vec<String> {
        self.readings
            .iter()
            .map(|r| r.room.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// First and last calendar date covered, or `None` when empty.
    #[must_use]
    pub fn date_span(&self) -> Option<DateRange> {
        let first = self.readings.first()?;
        let last = self.readings.last()?;
        Some(DateRange::new(first.date, last.date))
    }

    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        let span = self.date_span();
        DatasetSummary {
            rows_loaded: self.readings.len(),
            rows_dropped: self.rows_dropped,
            first_date: span.map(|s| s.start),
            last_date: span.map(|s| s.end),
            rooms: self.rooms(),
            energy_columns: self.energy_columns.clone(),
            supplied_total: self.supplied_total,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatasetSummary {
    /// Readings kept after timestamp parsing
    pub rows_loaded: usize,
    /// Rows dropped because their timestamp could not be parsed
    pub rows_dropped: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Sorted room labels
    pub rooms: Vec<String>,
    /// Energy sub-metric columns found in the input
    pub energy_columns: Vec<String>,
    /// True when totals came from a supplied `Total_Energy_kWh` column
    pub supplied_total: bool,
}
