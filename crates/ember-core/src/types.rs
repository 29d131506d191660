//! Fundamental identity, geometric and time types.

use std::fmt;

use chrono::{DateTime, Utc};
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Wall-clock instant used for detection times, mission logs and operation records.
pub type Timestamp = DateTime<Utc>;

/// Unique identifier of a response unit (drone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Unique identifier of an incident (fire focus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IncidentId(pub u32);

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// 2D position on the operations grid (distance units, typically km).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.as_dvec2().is_finite()
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.as_dvec2().distance(other.as_dvec2())
    }
}

/// Hours elapsed from `since` to `now`, clamped at zero for future timestamps.
pub fn hours_between(since: Timestamp, now: Timestamp) -> f64 {
    let millis = (now - since).num_milliseconds();
    if millis <= 0 {
        0.0
    } else {
        millis as f64 / 3_600_000.0
    }
}

/// Round to two decimal places. Only used at reporting boundaries.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
