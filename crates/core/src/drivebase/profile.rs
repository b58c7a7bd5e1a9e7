//! Precomputed ramp-speed table.
//!
//! Approximates constant-acceleration motion without measuring time: the
//! speed at distance `d` from the nearer end of a move is
//! `sqrt(2·d·accel + start_speed²)`, tabulated once at drivebase
//! construction and looked up per tick.

use heapless::Vec;
use libm::{roundf, sqrtf};

use super::heading::sign;
use super::DriveError;

/// Capacity of the ramp table; [`DriveParams::speed_table_len`](super::DriveParams)
/// must not exceed this.
pub const SPEED_TABLE_CAP: usize = 1024;

/// Immutable ramp-speed lookup table.
///
/// Entries are rounded to whole mm/s and non-decreasing in distance.
#[derive(Debug, Clone)]
pub struct SpeedProfile {
    table: Vec<f32, SPEED_TABLE_CAP>,
}

impl SpeedProfile {
    /// Build the table for `count` distances starting at 0.
    ///
    /// `table[d] = round(sqrt(2·d·accel + start_speed²))`.
    ///
    /// # Errors
    ///
    /// [`DriveError::Domain`] if the discriminant goes negative (negative
    /// acceleration), [`DriveError::TableOverflow`] past capacity,
    /// [`DriveError::InvalidParameter`] for an empty table.
    pub fn build(accel: f32, start_speed: f32, count: usize) -> Result<Self, DriveError> {
        if count == 0 {
            return Err(DriveError::InvalidParameter {
                reason: "speed table length must be non-zero",
            });
        }
        if count > SPEED_TABLE_CAP {
            return Err(DriveError::TableOverflow { requested: count });
        }

        let mut table = Vec::new();
        for d in 0..count {
            let discriminant = 2.0 * d as f32 * accel + start_speed * start_speed;
            if discriminant < 0.0 {
                return Err(DriveError::Domain { index: d });
            }
            let _ = table.push(roundf(sqrtf(discriminant)));
        }
        Ok(Self { table })
    }

    /// Number of tabulated distances.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Always `false` — [`build`](SpeedProfile::build) rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Ramp speed at `delta` mm from the nearer end of the move, capped at
    /// the requested cruise speed.
    ///
    /// `sign(cap) · min(table[min(delta, N-1)], |cap|)`.
    pub fn lookup(&self, delta: f32, cap: f32) -> f32 {
        let idx = (delta.max(0.0) as usize).min(self.table.len() - 1);
        sign(cap) * self.table[idx].min(cap.abs())
    }

    /// Symmetric ramp speed for a move of `distance` mm at `traveled` mm in.
    ///
    /// Distance to the nearer endpoint selects the table entry, so the ramp
    /// mirrors around the midpoint.
    pub fn ramp_speed(&self, distance: f32, traveled: f32, cap: f32) -> f32 {
        let delta = if traveled > distance / 2.0 {
            roundf((distance - traveled).abs())
        } else {
            roundf(traveled.abs())
        };
        self.lookup(delta, cap)
    }

    /// Peak ramp speed of a move of `distance` mm — the midpoint lookup.
    ///
    /// Feeds the default-timeout rule of
    /// [`MoveDistance`](super::MoveDistance).
    pub fn peak(&self, distance: f32, cap: f32) -> f32 {
        self.lookup(roundf(distance / 2.0), cap)
    }
}
