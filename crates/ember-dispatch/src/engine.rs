//! Dispatch engine: the façade drivers talk to.
//!
//! `DispatchEngine` owns the state store, the incident queue and the
//! optimizer, processes operator commands, and produces `DispatchEvent`s.
//! Completely headless; with a `ManualClock` every run is deterministic.
//! It is not shared between threads: one coordinating thread owns it and
//! serializes every mutation.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use ember_core::commands::DispatchCommand;
use ember_core::config::{DispatchConfig, OptimizerLimits};
use ember_core::enums::UnitStatus;
use ember_core::error::{DispatchError, Result};
use ember_core::events::DispatchEvent;
use ember_core::records::{Incident, IncidentSpec, OperationRecord, UnitSpec};
use ember_core::state::{AssignmentView, FleetReport, FleetSnapshot};
use ember_core::types::{IncidentId, Timestamp, UnitId};

use crate::clock::{Clock, SystemClock};
use crate::cost::CostModel;
use crate::optimizer::{Assignment, AssignmentOptimizer, OptimizeOutcome};
use crate::queue::IncidentQueue;
use crate::store::{FleetStore, ResolvedIncident};

/// Result of one applied optimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSummary {
    pub total_cost: f64,
    pub assignments: Vec<Assignment>,
    /// Wall-clock time spent in the optimizer.
    pub compute_duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Dispatched(DispatchSummary),
    /// Nothing was changed; the caller may retry later.
    NoAvailableUnits,
}

pub struct DispatchEngine {
    config: DispatchConfig,
    model: CostModel,
    clock: Box<dyn Clock>,
    store: FleetStore,
    queue: IncidentQueue,
    optimizer: AssignmentOptimizer,
    command_queue: VecDeque<DispatchCommand>,
    events: Vec<DispatchEvent>,
}

impl DispatchEngine {
    /// Create an engine on the system clock.
    pub fn new(config: DispatchConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: DispatchConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            model: CostModel::new(config.cost),
            config,
            clock,
            store: FleetStore::new(),
            queue: IncidentQueue::new(),
            optimizer: AssignmentOptimizer::new(),
            command_queue: VecDeque::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Read-only view of the state store.
    pub fn store(&self) -> &FleetStore {
        &self.store
    }

    pub fn queue(&self) -> &IncidentQueue {
        &self.queue
    }

    pub fn register_unit(&mut self, spec: UnitSpec) -> Result<UnitId> {
        spec.validate(self.config.fleet.max_energy)?;
        Ok(self.store.add_unit(spec))
    }

    /// Record a new incident and queue it with a score frozen at the current time.
    pub fn insert_incident(&mut self, spec: IncidentSpec) -> Result<IncidentId> {
        self.insert_incident_scored(spec).map(|(id, _)| id)
    }

    fn insert_incident_scored(&mut self, spec: IncidentSpec) -> Result<(IncidentId, f64)> {
        spec.validate()?;
        let id = self.store.add_incident(spec, &self.config.cost);
        let score = match self.store.incident(id) {
            Some(incident) => self.queue.insert(incident, self.clock.now()),
            None => return Err(DispatchError::UnknownIncident(id)),
        };
        Ok((id, score))
    }

    /// Compute the best assignment for the current state and apply it.
    pub fn optimize(&mut self) -> Result<DispatchOutcome> {
        let now = self.clock.now();
        let started = Instant::now();

        let units = self.store.available_units();
        if units.is_empty() && !self.queue.ranked_active(&self.store).is_empty() {
            warn!(pending = self.queue.len(), "no available units");
            return Ok(DispatchOutcome::NoAvailableUnits);
        }

        let incidents = candidate_incidents(&self.queue, &self.store, self.config.limits);
        let outcome = self
            .optimizer
            .optimize(&incidents, &units, &self.model, now)?;
        let compute_duration = started.elapsed();

        let plan = match outcome {
            OptimizeOutcome::Planned(plan) => plan,
            OptimizeOutcome::NoAvailableUnits => {
                warn!(pending = self.queue.len(), "no available units");
                return Ok(DispatchOutcome::NoAvailableUnits);
            }
        };

        let assignments = self.store.apply(&plan, now)?;
        self.store.record_operation(OperationRecord {
            timestamp: now,
            total_cost: plan.total_cost,
            compute_time: compute_duration,
            assignments: assignments.len(),
            cache_hits: plan.cache_hits,
            cache_misses: plan.cache_misses,
        });
        info!(
            assignments = assignments.len(),
            total_cost = plan.total_cost,
            micros = compute_duration.as_micros() as u64,
            "dispatch plan applied"
        );

        Ok(DispatchOutcome::Dispatched(DispatchSummary {
            total_cost: plan.total_cost,
            assignments,
            compute_duration,
        }))
    }

    /// Contain the highest-ranked queued incident that is still active.
    /// Returns `None` once the queue runs dry.
    pub fn resolve_next_incident(&mut self) -> Result<Option<ResolvedIncident>> {
        while let Some(entry) = self.queue.extract_max() {
            let still_active = self
                .store
                .incident(entry.incident_id)
                .is_some_and(Incident::is_active);
            if !still_active {
                continue;
            }
            let resolved = self
                .store
                .resolve_incident(entry.incident_id, &self.config.fleet)?;
            return Ok(Some(resolved));
        }
        Ok(None)
    }

    pub fn extinguish_incident(&mut self, id: IncidentId) -> Result<()> {
        self.store.extinguish_incident(id).map(|_| ())
    }

    pub fn set_maintenance(&mut self, id: UnitId, on: bool) -> Result<UnitStatus> {
        self.store.set_maintenance(id, on)
    }

    /// Re-insert every active queued incident with a score taken now.
    /// Returns the number of incidents left pending.
    pub fn rescore_queue(&mut self) -> usize {
        let now = self.clock.now();
        for entry in self.queue.drain_ranked() {
            if let Some(incident) = self.store.incident(entry.incident_id) {
                if incident.is_active() {
                    self.queue.insert(incident, now);
                }
            }
        }
        self.queue.len()
    }

    pub fn report(&self) -> FleetReport {
        self.store.report()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        self.store.snapshot(self.clock.now())
    }

    /// Queue an operator command for the next tick.
    pub fn queue_command(&mut self, command: DispatchCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = DispatchCommand>) {
        self.command_queue.extend(commands);
    }

    /// Process every queued command and return the events they produced.
    ///
    /// Rejected commands become `CommandRejected` events. An invariant
    /// violation aborts the tick and is returned as an error.
    pub fn tick(&mut self) -> Result<Vec<DispatchEvent>> {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                if matches!(err, DispatchError::InvariantViolation(_)) {
                    error!(%err, "dispatch invariant violated");
                    self.command_queue.clear();
                    return Err(err);
                }
                warn!(%err, "command rejected");
                self.events.push(DispatchEvent::CommandRejected {
                    reason: err.to_string(),
                });
            }
        }
        Ok(std::mem::take(&mut self.events))
    }

    fn handle_command(&mut self, command: DispatchCommand) -> Result<()> {
        match command {
            DispatchCommand::RegisterUnit { spec } => {
                let unit_id = self.register_unit(spec)?;
                self.events.push(DispatchEvent::UnitRegistered { unit_id });
            }
            DispatchCommand::ReportIncident { spec } => {
                let (incident_id, score) = self.insert_incident_scored(spec)?;
                self.events
                    .push(DispatchEvent::IncidentReported { incident_id, score });
            }
            DispatchCommand::Optimize => match self.optimize()? {
                DispatchOutcome::Dispatched(summary) => {
                    self.events.push(DispatchEvent::UnitsDispatched {
                        total_cost: summary.total_cost,
                        compute_micros: summary.compute_duration.as_micros() as u64,
                        assignments: summary
                            .assignments
                            .iter()
                            .map(|a| {
                                AssignmentView::new(
                                    a.unit_id,
                                    a.incident_id,
                                    a.breakdown.total_cost,
                                )
                            })
                            .collect(),
                    });
                }
                DispatchOutcome::NoAvailableUnits => {
                    self.events.push(DispatchEvent::NoAvailableUnits);
                }
            },
            DispatchCommand::ResolveNext => match self.resolve_next_incident()? {
                Some(resolved) => self.events.push(DispatchEvent::IncidentContained {
                    incident_id: resolved.incident.id,
                    released_units: resolved.released_units,
                }),
                None => self.events.push(DispatchEvent::QueueEmpty),
            },
            DispatchCommand::Extinguish { incident_id } => {
                self.extinguish_incident(incident_id)?;
                self.events
                    .push(DispatchEvent::IncidentExtinguished { incident_id });
            }
            DispatchCommand::RescoreQueue => {
                let pending = self.rescore_queue();
                self.events.push(DispatchEvent::QueueRescored { pending });
            }
            DispatchCommand::SetMaintenance { unit_id, on } => {
                self.set_maintenance(unit_id, on)?;
                self.events
                    .push(DispatchEvent::MaintenanceChanged { unit_id, on });
            }
        }
        Ok(())
    }
}

/// Incidents handed to the optimizer: queued, active, highest score first,
/// capped at `max_incidents_per_run`.
fn candidate_incidents<'a>(
    queue: &IncidentQueue,
    store: &'a FleetStore,
    limits: OptimizerLimits,
) -> Vec<&'a Incident> {
    queue
        .ranked_active(store)
        .into_iter()
        .filter(|incident| limits.allow_reinforcement || incident.responders.is_empty())
        .take(limits.max_incidents_per_run)
        .collect()
}
