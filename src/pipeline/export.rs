use super::dataset::{Dataset, SourceColumn};
use super::reading::{DATE, HOUR, Reading, TOTAL_ENERGY_KWH};

/// `%.f` prints nothing for whole seconds.
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Writes readings back out as CSV in the input's column order, followed by
/// the derived `Date`, `Hour` and `Total_Energy_kWh` columns.
///
/// Output is produced in chunks so callers can stream large views.
pub struct CsvExporter<'a> {
    columns: &'a [(String, SourceColumn)],
}

impl<'a> CsvExporter<'a> {
    #[must_use]
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            columns: dataset.columns(),
        }
    }

    #[must_use]
    pub fn header(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|(name, _)| name.clone())
            .chain([DATE, HOUR, TOTAL_ENERGY_KWH].map(str::to_string))
            .collect()
    }

    #[must_use]
    pub fn record(&self, reading: &Reading) -> Vec<String> {
        let mut record: Vec<String> = self
            .columns
            .iter()
            .map(|(_, source)| cell(reading, *source))
            .collect();
        record.push(reading.date.to_string());
        record.push(reading.hour.to_string());
        record.push(format_number(reading.total_energy_kwh));
        record
    }

    /// Serialize the header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV writer fails.
    pub fn header_bytes(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.header())?;
        into_bytes(writer)
    }

    /// Serialize a batch of data rows, without a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV writer fails.
    pub fn rows_bytes(&self, rows: &[&Reading]) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for reading in rows {
            writer.write_record(self.record(reading))?;
        }
        into_bytes(writer)
    }

    /// Serialize header and rows in one buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV writer fails.
    pub fn to_bytes(&self, rows: &[&Reading]) -> Result<Vec<u8>, csv::Error> {
        let mut out = self.header_bytes()?;
        out.extend(self.rows_bytes(rows)?);
        Ok(out)
    }
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, csv::Error> {
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn cell(reading: &Reading, source: SourceColumn) -> String {
    match source {
        SourceColumn::HomeId => reading.home_id.clone(),
        SourceColumn::DateTime => reading.timestamp.format(DATE_TIME_FORMAT).to_string(),
        SourceColumn::Temperature => optional(reading.temperature_c),
        SourceColumn::Humidity => optional(reading.humidity_pct),
        SourceColumn::Light => optional(reading.light_lux),
        SourceColumn::Motion => reading
            .motion_state
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        SourceColumn::Room => reading.room.clone(),
        SourceColumn::Energy(i) => optional(reading.energy_kwh.get(i).copied().flatten()),
        SourceColumn::Extra(i) => reading.extra.get(i).cloned().unwrap_or_default(),
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

/// Floats keep a decimal point (`21.0`, not `21`).
fn format_number(value: f64) -> String {
    format!("{value:?}")
}
