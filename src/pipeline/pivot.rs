use serde::Serialize;
use std::collections::BTreeSet;
use utoipa::ToSchema;

use super::filter::FilteredView;

pub const HOURS_PER_DAY: usize = 24;

/// Active-motion counts by hour of day and room.
///
/// Dense over all 24 hours and every room present in the view, so a cell
/// with no Active readings is an explicit zero. Rooms are sorted
/// alphabetically; `counts[hour][room_index]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MotionPivot {
    pub hours: Vec<u8>,
    pub rooms: Vec<String>,
    pub counts: Vec<Vec<u32>>,
}

impl MotionPivot {
    #[must_use]
    pub fn get(&self, hour: u8, room: &str) -> Option<u32> {
        let col = self.rooms.iter().position(|r| r == room)?;
        self.counts.get(usize::from(hour))?.get(col).copied()
    }

    /// Sum over every cell.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().map(|c| u64::from(*c)).sum()
    }
}

#[must_use]
pub fn motion_pivot(view: &FilteredView<'_>) -> MotionPivot {
    let rooms: Vec<String> = view
        .iter()
        .map(|r| r.room.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut counts = vec![vec![0u32; rooms.len()]; HOURS_PER_DAY];
    for reading in view.iter().filter(|r| r.is_active()) {
        // Rooms were collected from this same view, so the search always hits.
        if let Ok(col) = rooms.binary_search_by(|r| r.as_str().cmp(reading.room.as_str())) {
            counts[usize::from(reading.hour)][col] += 1;
        }
    }

    MotionPivot {
        hours: (0..24).collect(),
        rooms,
        counts,
    }
}
