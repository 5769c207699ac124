//! CSV ingestion and normalization.
//!
//! Runs once per dataset load. Rows whose `DateTime` cannot be parsed are
//! dropped and counted; unparseable numeric cells become missing values.
//! A missing required column aborts the load with the column's name.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::dataset::{Dataset, SourceColumn};
use super::reading::{
    self, DATE, DATE_TIME, DEFAULT_ENERGY_COLUMNS, HOME_ID, HOUR, HUMIDITY_PCT, LIGHT_LUX,
    MOTION_SENSOR, MotionState, REQUIRED_COLUMNS, ROOM, Reading, TEMPERATURE_C, TOTAL_ENERGY_KWH,
};

const DATE_TIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Data source not found: {0}")]
    SourceNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Energy sub-metric columns summed into each reading's total
    pub energy_columns: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            energy_columns: DEFAULT_ENERGY_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// Header positions resolved once before any row is read.
struct ColumnLayout {
    home_id: usize,
    date_time: usize,
    temperature: usize,
    humidity: usize,
    light: usize,
    motion: usize,
    room: usize,
    energy: Vec<usize>,
    energy_names: Vec<String>,
    supplied_total: Option<usize>,
    extra: Vec<usize>,
    columns: Vec<(String, SourceColumn)>,
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord, options: &IngestOptions) -> Result<Self, IngestError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let mut required = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = position(name).ok_or(IngestError::MissingColumn(name))?;
        }
        let [home_id, date_time, temperature, humidity, light, motion, room] = required;

        let mut energy = Vec::new();
        let mut energy_names = Vec::new();
        for name in &options.energy_columns {
            if let Some(idx) = position(name) {
                energy.push(idx);
                energy_names.push(name.clone());
            }
        }

        // Sub-metrics win over a supplied total whenever any of them exist.
        let supplied_total = if energy.is_empty() {
            position(TOTAL_ENERGY_KWH)
        } else {
            None
        };

        let mut extra = Vec::new();
        let mut columns = Vec::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            let source = match name {
                HOME_ID if idx == home_id => SourceColumn::HomeId,
                DATE_TIME if idx == date_time => SourceColumn::DateTime,
                TEMPERATURE_C if idx == temperature => SourceColumn::Temperature,
                HUMIDITY_PCT if idx == humidity => SourceColumn::Humidity,
                LIGHT_LUX if idx == light => SourceColumn::Light,
                MOTION_SENSOR if idx == motion => SourceColumn::Motion,
                ROOM if idx == room => SourceColumn::Room,
                // Derived on export
                TOTAL_ENERGY_KWH | DATE | HOUR => continue,
                _ => match energy.iter().position(|e| *e == idx) {
                    Some(slot) => SourceColumn::Energy(slot),
                    None => {
                        extra.push(idx);
                        SourceColumn::Extra(extra.len() - 1)
                    }
                },
            };
            columns.push((name.to_string(), source));
        }

        Ok(Self {
            home_id,
            date_time,
            temperature,
            humidity,
            light,
            motion,
            room,
            energy,
            energy_names,
            supplied_total,
            extra,
            columns,
        })
    }

    /// Normalize one record, or `None` when its timestamp does not parse.
    fn reading(&self, record: &StringRecord) -> Option<Reading> {
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let timestamp = parse_timestamp(field(self.date_time))?;
        let energy = self
            .energy
            .iter()
            .map(|idx| reading::parse_energy(field(*idx)))
            .collect();

        let mut normalized = Reading::new(
            field(self.home_id).trim().to_string(),
            timestamp,
            field(self.room).trim().to_string(),
            MotionState::parse(field(self.motion)),
            energy,
        )
        .with_comfort(
            reading::parse_number(field(self.temperature)),
            reading::parse_number(field(self.humidity)),
            reading::parse_number(field(self.light)),
        );

        if let Some(idx) = self.supplied_total {
            normalized = normalized.with_supplied_total(reading::parse_number(field(idx)));
        }
        normalized.extra = self.extra.iter().map(|idx| field(*idx).to_string()).collect();

        Some(normalized)
    }
}

/// Parse a `DateTime` cell into wall-clock time.
///
/// Offsets in RFC 3339 input are kept as recorded, so the hour of day is the
/// hour the sensor logged. Date-only values resolve to midnight.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Ingest CSV data from any reader.
///
/// # Errors
///
/// Returns `IngestError::MissingColumn` naming the first absent required
/// column, or `IngestError::Csv` if the stream itself cannot be read.
pub fn ingest_csv<R: Read>(input: R, options: &IngestOptions) -> Result<Dataset, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let layout = ColumnLayout::resolve(&headers, options)?;

    let mut readings = Vec::new();
    let mut rows_dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        match layout.reading(&record) {
            Some(r) => readings.push(r),
            None => rows_dropped += 1,
        }
    }

    if rows_dropped > 0 {
        tracing::debug!(rows_dropped, "Dropped rows with unparseable timestamps");
    }

    Ok(Dataset::new(
        readings,
        layout.columns,
        layout.energy_names,
        rows_dropped,
        layout.supplied_total.is_some(),
    ))
}

/// Ingest a CSV file from disk.
///
/// # Errors
///
/// Returns `IngestError::SourceNotFound` if the file does not exist, plus
/// everything [`ingest_csv`] can return.
pub fn ingest_path(path: &Path, options: &IngestOptions) -> Result<Dataset, IngestError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IngestError::SourceNotFound(path.display().to_string()),
        _ => IngestError::Io(e),
    })?;
    ingest_csv(BufReader::new(file), options)
}
