use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

use super::filter::FilteredView;

/// Headline metrics of a filtered view.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Metrics {
    pub reading_count: usize,
    /// Readings with motion_state == Active
    pub active_reading_count: usize,
    pub total_energy_kwh: f64,
    /// Distinct rooms with at least one Active reading
    pub active_room_count: usize,
    /// Mean over present values; null when none are present
    pub mean_temperature_c: Option<f64>,
    /// Mean over present values; null when none are present
    pub mean_humidity_pct: Option<f64>,
}

impl Metrics {
    #[must_use]
    pub fn estimated_cost(&self, rate: ElectricityRate) -> f64 {
        self.total_energy_kwh * rate.per_kwh()
    }
}

#[must_use]
pub fn summarize(view: &FilteredView<'_>) -> Metrics {
    let mut total_energy_kwh = 0.0;
    let mut active_reading_count = 0;
    let mut active_rooms = HashSet::new();
    let mut temperature = Mean::default();
    let mut humidity = Mean::default();

    for reading in view.iter() {
        total_energy_kwh += reading.total_energy_kwh;
        if reading.is_active() {
            active_reading_count += 1;
            active_rooms.insert(reading.room.as_str());
        }
        temperature.push(reading.temperature_c);
        humidity.push(reading.humidity_pct);
    }

    Metrics {
        reading_count: view.len(),
        active_reading_count,
        total_energy_kwh,
        active_room_count: active_rooms.len(),
        mean_temperature_c: temperature.value(),
        mean_humidity_pct: humidity.value(),
    }
}

/// Running mean that skips missing values.
#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Accepted electricity rate range in currency units per kWh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl Default for RateBounds {
    fn default() -> Self {
        Self {
            min: 0.05,
            max: 0.50,
            default: 0.15,
        }
    }
}

/// A rate already clamped into its [`RateBounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricityRate(f64);

impl ElectricityRate {
    /// Clamp a user-supplied rate. Missing, non-finite or non-positive
    /// requests fall back to the default rate.
    #[must_use]
    pub fn clamped(requested: Option<f64>, bounds: &RateBounds) -> Self {
        let rate = requested
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(bounds.default);
        Self(rate.clamp(bounds.min, bounds.max))
    }

    #[must_use]
    pub fn per_kwh(self) -> f64 {
        self.0
    }
}
