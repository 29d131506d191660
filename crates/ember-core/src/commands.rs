//! Operator commands sent from a driver to the dispatch engine.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::records::{IncidentSpec, UnitSpec};
use crate::types::{IncidentId, UnitId};

/// All possible operator actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DispatchCommand {
    /// Add a unit to the fleet.
    RegisterUnit { spec: UnitSpec },
    /// Report a newly detected incident.
    ReportIncident { spec: IncidentSpec },
    /// Run the optimizer over active incidents and apply the plan.
    Optimize,
    /// Contain the highest-ranked pending incident and release its units.
    ResolveNext,
    /// Mark a contained incident as extinguished.
    Extinguish { incident_id: IncidentId },
    /// Re-score every active incident in the queue against the current time.
    RescoreQueue,
    /// Move a unit in or out of maintenance.
    SetMaintenance { unit_id: UnitId, on: bool },
}
