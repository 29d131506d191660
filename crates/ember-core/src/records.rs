//! Fixed-schema records for units, incidents and optimizer runs.
//!
//! Records are owned by the state store. Everything else sees clones or
//! shared references.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::CostWeights;
use crate::enums::*;
use crate::error::DispatchError;
use crate::types::{IncidentId, Position, Timestamp, UnitId};

/// One completed dispatch in a unit's mission log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionEntry {
    pub incident_id: IncidentId,
    pub dispatched_at: Timestamp,
    pub cost: f64,
}

/// Attributes needed to register a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub position: Position,
    pub energy: f64,
    pub capacity: f64,
    pub speed: f64,
}

impl UnitSpec {
    pub fn validate(&self, max_energy: f64) -> Result<(), DispatchError> {
        if !self.position.is_finite() {
            return Err(DispatchError::InvalidUnit(format!(
                "position must be finite, got ({}, {})",
                self.position.x, self.position.y
            )));
        }
        if !(self.capacity.is_finite() && self.capacity > 0.0) {
            return Err(DispatchError::InvalidUnit(format!(
                "capacity must be positive, got {}",
                self.capacity
            )));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(DispatchError::InvalidUnit(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        if !(self.energy.is_finite() && (0.0..=max_energy).contains(&self.energy)) {
            return Err(DispatchError::InvalidUnit(format!(
                "energy must be within 0..={max_energy}, got {}",
                self.energy
            )));
        }
        Ok(())
    }
}

/// A response drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub position: Position,
    /// Remaining energy budget, within `[0, max_energy]`.
    pub energy: f64,
    /// Throughput factor. Higher capacity lowers the distance term of the cost.
    pub capacity: f64,
    /// Distance units per hour.
    pub speed: f64,
    pub status: UnitStatus,
    /// Append-only.
    pub missions: Vec<MissionEntry>,
    /// Cumulative fuel consumed by dispatches.
    pub resources_consumed: f64,
}

impl Unit {
    pub fn new(id: UnitId, spec: UnitSpec) -> Self {
        Self {
            id,
            position: spec.position,
            energy: spec.energy,
            capacity: spec.capacity,
            speed: spec.speed,
            status: UnitStatus::Available,
            missions: Vec::new(),
            resources_consumed: 0.0,
        }
    }

    /// Whether any mission in this unit's log targeted `incident_id`.
    pub fn has_served(&self, incident_id: IncidentId) -> bool {
        self.missions.iter().any(|m| m.incident_id == incident_id)
    }
}

/// Attributes needed to report an incident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidentSpec {
    pub position: Position,
    pub intensity: u32,
    pub wind_factor: f64,
    pub priority: PriorityClass,
    pub area: f64,
    pub detected_at: Timestamp,
}

impl IncidentSpec {
    pub fn validate(&self) -> Result<(), DispatchError> {
        if !self.position.is_finite() {
            return Err(DispatchError::InvalidIncident(format!(
                "position must be finite, got ({}, {})",
                self.position.x, self.position.y
            )));
        }
        if self.intensity == 0 {
            return Err(DispatchError::InvalidIncident(
                "intensity must be positive".into(),
            ));
        }
        if !(self.area.is_finite() && self.area > 0.0) {
            return Err(DispatchError::InvalidIncident(format!(
                "affected area must be positive, got {}",
                self.area
            )));
        }
        if !(self.wind_factor.is_finite() && self.wind_factor > 0.0) {
            return Err(DispatchError::InvalidIncident(format!(
                "wind factor must be positive, got {}",
                self.wind_factor
            )));
        }
        Ok(())
    }
}

/// A fire focus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub position: Position,
    pub intensity: u32,
    pub wind_factor: f64,
    pub priority: PriorityClass,
    pub area: f64,
    pub detected_at: Timestamp,
    pub status: IncidentStatus,
    /// Derived at creation: intensity × area × resource factor.
    pub required_resources: f64,
    /// Derived at creation, in hours.
    pub estimated_duration: f64,
    /// Units dispatched to this incident, in dispatch order.
    pub responders: Vec<UnitId>,
}

impl Incident {
    pub fn new(id: IncidentId, spec: IncidentSpec, weights: &CostWeights) -> Self {
        let load = spec.intensity as f64 * spec.area;
        Self {
            id,
            position: spec.position,
            intensity: spec.intensity,
            wind_factor: spec.wind_factor,
            priority: spec.priority,
            area: spec.area,
            detected_at: spec.detected_at,
            status: IncidentStatus::Active,
            required_resources: load * weights.resource_factor,
            estimated_duration: weights.duration_base_hours + load * weights.duration_factor,
            responders: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == IncidentStatus::Active
    }
}

/// Cost model output for one (unit, incident) pair. Recomputed on every query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub distance: f64,
    /// Hours.
    pub travel_time: f64,
    pub fuel_cost: f64,
    /// capacity / required resources, capped at 1.0.
    pub efficiency: f64,
    pub wind_penalty: f64,
    /// 1 / priority weight.
    pub priority_bonus: f64,
    pub staleness_penalty: f64,
    pub base_cost: f64,
    pub total_cost: f64,
    pub required_energy: f64,
    pub feasible: bool,
}

/// Immutable log entry for one optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub timestamp: Timestamp,
    pub total_cost: f64,
    pub compute_time: Duration,
    pub assignments: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}
