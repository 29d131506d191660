//! Read-only views of dispatcher state handed to reporting collaborators.

use serde::{Deserialize, Serialize};

use crate::records::{Incident, OperationRecord, Unit};
use crate::types::{round2, IncidentId, Timestamp, UnitId};

/// Aggregate counts over the state store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetReport {
    pub units_available: u32,
    pub units_on_mission: u32,
    pub units_maintenance: u32,
    pub incidents_active: u32,
    pub incidents_contained: u32,
    pub incidents_extinguished: u32,
    pub operations: u32,
    pub resources_consumed: f64,
}

impl FleetReport {
    pub fn total_units(&self) -> u32 {
        self.units_available + self.units_on_mission + self.units_maintenance
    }

    pub fn total_incidents(&self) -> u32 {
        self.incidents_active + self.incidents_contained + self.incidents_extinguished
    }
}

/// One dispatched pair, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentView {
    pub unit_id: UnitId,
    pub incident_id: IncidentId,
    pub cost: f64,
}

impl AssignmentView {
    pub fn new(unit_id: UnitId, incident_id: IncidentId, cost: f64) -> Self {
        Self {
            unit_id,
            incident_id,
            cost: round2(cost),
        }
    }
}

/// Full dump of the state store, used for JSON snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub taken_at: Timestamp,
    pub units: Vec<Unit>,
    pub incidents: Vec<Incident>,
    pub operations: Vec<OperationRecord>,
    pub report: FleetReport,
}
