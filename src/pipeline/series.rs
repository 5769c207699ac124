use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use super::filter::FilteredView;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EnergyPoint {
    pub timestamp: NaiveDateTime,
    pub room: String,
    pub total_energy_kwh: f64,
}

/// Temperature and humidity aligned on a shared time axis.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComfortTrend {
    pub times: Vec<NaiveDateTime>,
    /// Same length as times, null for missing data
    pub temperature_c: Vec<Option<f64>>,
    /// Same length as times, null for missing data
    pub humidity_pct: Vec<Option<f64>>,
}

/// Per-reading energy totals in time order, tagged by room.
#[must_use]
pub fn energy_trend(view: &FilteredView<'_>) -> Vec<EnergyPoint> {
    view.iter()
        .map(|r| EnergyPoint {
            timestamp: r.timestamp,
            room: r.room.clone(),
            total_energy_kwh: r.total_energy_kwh,
        })
        .collect()
}

#[must_use]
pub fn comfort_trend(view: &FilteredView<'_>) -> ComfortTrend {
    let mut trend = ComfortTrend {
        times: Vec::with_capacity(view.len()),
        temperature_c: Vec::with_capacity(view.len()),
        humidity_pct: Vec::with_capacity(view.len()),
    };
    for reading in view.iter() {
        trend.times.push(reading.timestamp);
        trend.temperature_c.push(reading.temperature_c);
        trend.humidity_pct.push(reading.humidity_pct);
    }
    trend
}
