//! Fleet/incident state store, the single writer of unit and incident records.
//!
//! Every mutation is validated in full before anything is written, so a
//! rejected plan leaves the store untouched.

use std::collections::{BTreeMap, HashSet};

use tracing::info;

use ember_core::config::{CostWeights, FleetPolicy};
use ember_core::enums::{IncidentStatus, UnitStatus};
use ember_core::error::{DispatchError, Result};
use ember_core::records::*;
use ember_core::state::{FleetReport, FleetSnapshot};
use ember_core::types::{IncidentId, Timestamp, UnitId};

use crate::optimizer::{Assignment, AssignmentPlan};

/// Outcome of containing an incident.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIncident {
    pub incident: Incident,
    /// Units returned to Available, in id order.
    pub released_units: Vec<UnitId>,
}

#[derive(Debug, Default)]
pub struct FleetStore {
    units: BTreeMap<UnitId, Unit>,
    incidents: BTreeMap<IncidentId, Incident>,
    operations: Vec<OperationRecord>,
    next_unit_id: u32,
    next_incident_id: u32,
}

impl FleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, spec: UnitSpec) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, spec));
        id
    }

    pub fn add_incident(&mut self, spec: IncidentSpec, weights: &CostWeights) -> IncidentId {
        let id = IncidentId(self.next_incident_id);
        self.next_incident_id += 1;
        self.incidents.insert(id, Incident::new(id, spec, weights));
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn incident(&self, id: IncidentId) -> Option<&Incident> {
        self.incidents.get(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn incidents(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.values()
    }

    /// Available units in id order: the optimizer's unit sequence.
    pub fn available_units(&self) -> Vec<&Unit> {
        self.units
            .values()
            .filter(|u| u.status == UnitStatus::Available)
            .collect()
    }

    pub fn operations(&self) -> &[OperationRecord] {
        &self.operations
    }

    pub fn record_operation(&mut self, record: OperationRecord) {
        self.operations.push(record);
    }

    /// Apply a plan computed against the current state.
    ///
    /// Fails with `InvariantViolation` (and writes nothing) if any unit is not
    /// Available, any incident is not Active, or a unit or incident repeats.
    pub fn apply(&mut self, plan: &AssignmentPlan, now: Timestamp) -> Result<Vec<Assignment>> {
        let mut seen_units = HashSet::new();
        let mut seen_incidents = HashSet::new();
        for a in &plan.assignments {
            let unit = self
                .units
                .get(&a.unit_id)
                .ok_or(DispatchError::UnknownUnit(a.unit_id))?;
            let incident = self
                .incidents
                .get(&a.incident_id)
                .ok_or(DispatchError::UnknownIncident(a.incident_id))?;
            if unit.status.dispatch().is_none() {
                return Err(DispatchError::InvariantViolation(format!(
                    "unit {} is {:?}, cannot dispatch",
                    a.unit_id, unit.status
                )));
            }
            if !incident.is_active() {
                return Err(DispatchError::InvariantViolation(format!(
                    "incident {} is {:?}, cannot receive units",
                    a.incident_id, incident.status
                )));
            }
            if !seen_units.insert(a.unit_id) {
                return Err(DispatchError::InvariantViolation(format!(
                    "unit {} assigned twice",
                    a.unit_id
                )));
            }
            if !seen_incidents.insert(a.incident_id) {
                return Err(DispatchError::InvariantViolation(format!(
                    "incident {} assigned twice",
                    a.incident_id
                )));
            }
        }

        for a in &plan.assignments {
            if let Some(unit) = self.units.get_mut(&a.unit_id) {
                unit.status = unit.status.dispatch().unwrap_or(unit.status);
                unit.missions.push(MissionEntry {
                    incident_id: a.incident_id,
                    dispatched_at: now,
                    cost: a.breakdown.total_cost,
                });
                unit.resources_consumed += a.breakdown.fuel_cost;
            }
            if let Some(incident) = self.incidents.get_mut(&a.incident_id) {
                incident.responders.push(a.unit_id);
            }
            info!(
                unit = %a.unit_id,
                incident = %a.incident_id,
                cost = a.breakdown.total_cost,
                "unit dispatched"
            );
        }

        Ok(plan.assignments.clone())
    }

    /// Contain an active incident and release its units.
    ///
    /// Each released unit loses `policy.resolution_drain` energy, floored at
    /// `policy.energy_floor`. A unit already below the floor keeps its level.
    pub fn resolve_incident(
        &mut self,
        id: IncidentId,
        policy: &FleetPolicy,
    ) -> Result<ResolvedIncident> {
        let incident = self
            .incidents
            .get_mut(&id)
            .ok_or(DispatchError::UnknownIncident(id))?;
        incident.status = match incident.status.advance() {
            Some(next @ IncidentStatus::Contained) => next,
            _ => {
                return Err(DispatchError::IncidentStatusMismatch {
                    id,
                    status: incident.status,
                    expected: IncidentStatus::Active,
                })
            }
        };
        let incident = incident.clone();

        let mut released_units = Vec::new();
        for unit in self.units.values_mut() {
            if !unit.has_served(id) {
                continue;
            }
            let Some(next) = unit.status.release() else {
                continue;
            };
            unit.status = next;
            if unit.energy > policy.energy_floor {
                unit.energy = (unit.energy - policy.resolution_drain).max(policy.energy_floor);
            }
            released_units.push(unit.id);
        }

        info!(incident = %id, released = released_units.len(), "incident contained");
        Ok(ResolvedIncident {
            incident,
            released_units,
        })
    }

    /// Move a contained incident to extinguished.
    pub fn extinguish_incident(&mut self, id: IncidentId) -> Result<&Incident> {
        let incident = self
            .incidents
            .get_mut(&id)
            .ok_or(DispatchError::UnknownIncident(id))?;
        incident.status = match incident.status.advance() {
            Some(next @ IncidentStatus::Extinguished) => next,
            _ => {
                return Err(DispatchError::IncidentStatusMismatch {
                    id,
                    status: incident.status,
                    expected: IncidentStatus::Contained,
                })
            }
        };
        Ok(incident)
    }

    /// Operator override in or out of maintenance. Units on mission refuse.
    pub fn set_maintenance(&mut self, id: UnitId, on: bool) -> Result<UnitStatus> {
        let unit = self
            .units
            .get_mut(&id)
            .ok_or(DispatchError::UnknownUnit(id))?;
        let next = unit
            .status
            .set_maintenance(on)
            .ok_or(DispatchError::UnitBusy {
                id,
                status: unit.status,
            })?;
        unit.status = next;
        Ok(next)
    }

    /// Aggregate counts. Pure read.
    pub fn report(&self) -> FleetReport {
        let mut report = FleetReport {
            operations: self.operations.len() as u32,
            ..Default::default()
        };
        for unit in self.units.values() {
            match unit.status {
                UnitStatus::Available => report.units_available += 1,
                UnitStatus::OnMission => report.units_on_mission += 1,
                UnitStatus::Maintenance => report.units_maintenance += 1,
            }
            report.resources_consumed += unit.resources_consumed;
        }
        for incident in self.incidents.values() {
            match incident.status {
                IncidentStatus::Active => report.incidents_active += 1,
                IncidentStatus::Contained => report.incidents_contained += 1,
                IncidentStatus::Extinguished => report.incidents_extinguished += 1,
            }
        }
        report
    }

    /// Full copy of the store for serialization.
    pub fn snapshot(&self, taken_at: Timestamp) -> FleetSnapshot {
        FleetSnapshot {
            taken_at,
            units: self.units.values().cloned().collect(),
            incidents: self.incidents.values().cloned().collect(),
            operations: self.operations.clone(),
            report: self.report(),
        }
    }
}
