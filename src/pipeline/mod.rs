//! Filter and aggregation pipeline over smart-home sensor readings.
//!
//! A CSV export is ingested once into an immutable [`Dataset`]. Every request
//! then builds a fresh [`FilterCriteria`], runs [`filter`], and derives its
//! widgets (metrics, motion pivot, latest readings, room breakdown, trends)
//! from the resulting [`FilteredView`]. Nothing below the ingestion boundary
//! is cached.

pub mod dataset;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod pivot;
pub mod reading;
pub mod rooms;
pub mod series;
pub mod summary;

pub use dataset::{Dataset, DatasetSummary};
pub use export::CsvExporter;
pub use filter::{
    DateRange, FilterCriteria, FilterOutcome, FilteredView, MotionFilter, RoomFilter, filter,
    latest_n,
};
pub use ingest::{IngestError, IngestOptions, ingest_csv, ingest_path};
pub use pivot::{MotionPivot, motion_pivot};
pub use reading::{MotionState, Reading};
pub use rooms::{Distribution, RoomStats, room_breakdown};
pub use series::{ComfortTrend, EnergyPoint, comfort_trend, energy_trend};
pub use summary::{ElectricityRate, Metrics, RateBounds, summarize};
