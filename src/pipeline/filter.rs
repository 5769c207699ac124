use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dataset::Dataset;
use super::reading::{MotionState, Reading};

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomFilter {
    All,
    Room(String),
}

impl RoomFilter {
    /// `"all"` (any case) or an empty value selects every room.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::All,
            Some(s) if s.eq_ignore_ascii_case("all") => Self::All,
            Some(s) => Self::Room(s.to_string()),
        }
    }

    fn matches(&self, reading: &Reading) -> bool {
        match self {
            Self::All => true,
            Self::Room(room) => reading.room == *room,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MotionFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl MotionFilter {
    fn matches(self, reading: &Reading) -> bool {
        match self {
            Self::All => true,
            Self::Active => reading.motion_state == Some(MotionState::Active),
            Self::Inactive => reading.motion_state == Some(MotionState::Inactive),
        }
    }
}

/// One request's filter selection. All predicates are ANDed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub room: RoomFilter,
    /// `None` spans the whole dataset.
    pub date_range: Option<DateRange>,
    pub motion: MotionFilter,
}

impl FilterCriteria {
    /// Criteria that match every reading.
    #[must_use]
    pub fn all() -> Self {
        Self {
            room: RoomFilter::All,
            date_range: None,
            motion: MotionFilter::All,
        }
    }

    #[must_use]
    pub fn room(mut self, room: &str) -> Self {
        self.room = RoomFilter::Room(room.to_string());
        self
    }

    #[must_use]
    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    #[must_use]
    pub fn motion(mut self, motion: MotionFilter) -> Self {
        self.motion = motion;
        self
    }

    #[must_use]
    pub fn matches(&self, reading: &Reading) -> bool {
        self.room.matches(reading)
            && self.date_range.is_none_or(|r| r.contains(reading.date))
            && self.motion.matches(reading)
    }
}

/// Readings that passed a [`FilterCriteria`], in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Reading>,
}

impl<'a> FilteredView<'a> {
    #[must_use]
    pub fn rows(&self) -> &[&'a Reading] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Reading> + '_ {
        self.rows.iter().copied()
    }

    /// Apply further criteria to this view.
    #[must_use]
    pub fn refine(&self, criteria: &FilterCriteria) -> FilterOutcome<'a> {
        apply(self.iter(), criteria)
    }
}

#[derive(Debug, Clone)]
pub enum FilterOutcome<'a> {
    Matched(FilteredView<'a>),
    /// No reading satisfied the criteria.
    NoMatches,
}

impl<'a> FilterOutcome<'a> {
    #[must_use]
    pub fn view(&self) -> Option<&FilteredView<'a>> {
        match self {
            Self::Matched(view) => Some(view),
            Self::NoMatches => None,
        }
    }

    #[must_use]
    pub fn into_view(self) -> Option<FilteredView<'a>> {
        match self {
            Self::Matched(view) => Some(view),
            Self::NoMatches => None,
        }
    }
}

fn apply<'a>(
    readings: impl Iterator<Item = &'a Reading>,
    criteria: &FilterCriteria,
) -> FilterOutcome<'a> {
    let rows: Vec<&Reading> = readings.filter(|r| criteria.matches(r)).collect();
    if rows.is_empty() {
        FilterOutcome::NoMatches
    } else {
        FilterOutcome::Matched(FilteredView { rows })
    }
}

/// Select the readings of `dataset` matching `criteria`.
#[must_use]
pub fn filter<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilterOutcome<'a> {
    apply(dataset.readings().iter(), criteria)
}

/// The `n` most recent readings of a view, newest first.
#[must_use]
pub fn latest_n<'a>(view: &FilteredView<'a>, n: usize) -> Vec<&'a Reading> {
    // Rows are already ascending, so walking backwards yields newest first.
    view.rows.iter().rev().take(n).copied().collect()
}
