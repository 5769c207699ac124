use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::filter::FilteredView;
use super::reading::Reading;

/// Five-number summary plus mean, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Distribution {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl Distribution {
    /// Summarize `values`, or `None` if there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        Some(Self {
            count,
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[count - 1],
            mean,
        })
    }
}

/// Linear-interpolated quantile of non-empty sorted values.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RoomStats {
    pub room: String,
    pub reading_count: usize,
    /// Share of readings with Active motion, 0-100
    pub motion_active_pct: f64,
    pub energy_kwh: Option<Distribution>,
    pub temperature_c: Option<Distribution>,
    pub humidity_pct: Option<Distribution>,
    pub light_lux: Option<Distribution>,
}

/// Per-room comparison of energy, comfort and motion, sorted by room.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn room_breakdown(view: &FilteredView<'_>) -> Vec<RoomStats> {
    let mut by_room: BTreeMap<&str, Vec<&Reading>> = BTreeMap::new();
    for reading in view.iter() {
        by_room.entry(reading.room.as_str()).or_default().push(reading);
    }

    by_room
        .into_iter()
        .map(|(room, rows)| {
            let active = rows.iter().filter(|r| r.is_active()).count();
            let present = |f: fn(&Reading) -> Option<f64>| -> Vec<f64> {
                rows.iter().filter_map(|r| f(r)).collect()
            };

            RoomStats {
                room: room.to_string(),
                reading_count: rows.len(),
                motion_active_pct: active as f64 * 100.0 / rows.len() as f64,
                energy_kwh: Distribution::from_values(
                    rows.iter().map(|r| r.total_energy_kwh).collect(),
                ),
                temperature_c: Distribution::from_values(present(|r| r.temperature_c)),
                humidity_pct: Distribution::from_values(present(|r| r.humidity_pct)),
                light_lux: Distribution::from_values(present(|r| r.light_lux)),
            }
        })
        .collect()
}
