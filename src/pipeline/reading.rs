use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

pub const HOME_ID: &str = "Home_ID";
pub const DATE_TIME: &str = "DateTime";
pub const TEMPERATURE_C: &str = "Temperature_C";
pub const HUMIDITY_PCT: &str = "Humidity_%";
pub const LIGHT_LUX: &str = "Light_Lux";
pub const MOTION_SENSOR: &str = "Motion_Sensor";
pub const ROOM: &str = "Room";
pub const TOTAL_ENERGY_KWH: &str = "Total_Energy_kWh";

/// Columns appended to every export after the input columns.
pub const DATE: &str = "Date";
pub const HOUR: &str = "Hour";

/// Columns every input file must carry, in the order they are checked.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    HOME_ID,
    DATE_TIME,
    TEMPERATURE_C,
    HUMIDITY_PCT,
    LIGHT_LUX,
    MOTION_SENSOR,
    ROOM,
];

/// Energy sub-metric columns summed into the per-reading total.
pub const DEFAULT_ENERGY_COLUMNS: [&str; 3] =
    ["Appliance_Usage_kWh", "HVAC_Usage_kWh", "Water_Heater_kWh"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum MotionState {
    Active,
    Inactive,
}

impl MotionState {
    /// Parse a motion sensor cell. Case-insensitive, surrounding whitespace ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("active") {
            Some(Self::Active)
        } else if raw.eq_ignore_ascii_case("inactive") {
            Some(Self::Inactive)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

/// One normalized sensor row.
///
/// Built once at ingestion and never mutated afterwards. `date` and `hour`
/// are derived from `timestamp`; `total_energy_kwh` is always present and
/// non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub home_id: String,
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub hour: u8,
    pub room: String,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub light_lux: Option<f64>,
    pub motion_state: Option<MotionState>,
    /// Sub-metric values aligned with `Dataset::energy_columns`.
    pub energy_kwh: Vec<Option<f64>>,
    pub total_energy_kwh: f64,
    /// Raw values of unrecognized input columns, aligned with `Dataset::extra_columns`.
    pub extra: Vec<String>,
}

impl Reading {
    /// Assemble a reading and derive its date, hour and energy total.
    #[must_use]
    pub fn new(
        home_id: String,
        timestamp: NaiveDateTime,
        room: String,
        motion_state: Option<MotionState>,
        energy_kwh: Vec<Option<f64>>,
    ) -> Self {
        let total_energy_kwh = sum_energy(&energy_kwh);
        Self {
            home_id,
            timestamp,
            date: timestamp.date(),
            hour: u8::try_from(timestamp.hour()).unwrap_or(0),
            room,
            temperature_c: None,
            humidity_pct: None,
            light_lux: None,
            motion_state,
            energy_kwh,
            total_energy_kwh,
            extra: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_comfort(
        mut self,
        temperature_c: Option<f64>,
        humidity_pct: Option<f64>,
        light_lux: Option<f64>,
    ) -> Self {
        self.temperature_c = temperature_c;
        self.humidity_pct = humidity_pct;
        self.light_lux = light_lux;
        self
    }

    /// Replace the recomputed total with a value supplied by the input file.
    #[must_use]
    pub fn with_supplied_total(mut self, total: Option<f64>) -> Self {
        self.total_energy_kwh = total.filter(|v| *v >= 0.0).unwrap_or(0.0);
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.motion_state == Some(MotionState::Active)
    }
}

/// Sum present sub-metrics, counting missing values as zero.
#[must_use]
pub fn sum_energy(values: &[Option<f64>]) -> f64 {
    values
        .iter()
        .flatten()
        .filter(|v| v.is_finite() && **v >= 0.0)
        .sum()
}

/// Parse a numeric cell. Empty, unparseable and non-finite values are missing.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an energy cell. Negative readings are treated as missing.
#[must_use]
pub fn parse_energy(raw: &str) -> Option<f64> {
    parse_number(raw).filter(|v| *v >= 0.0)
}

/// Round to two decimals for display tables.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
