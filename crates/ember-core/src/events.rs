//! Events emitted by the engine for reporting and logging collaborators.

use serde::{Deserialize, Serialize};

use crate::state::AssignmentView;
use crate::types::{IncidentId, UnitId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DispatchEvent {
    UnitRegistered {
        unit_id: UnitId,
    },
    IncidentReported {
        incident_id: IncidentId,
        score: f64,
    },
    /// An optimizer run was applied.
    UnitsDispatched {
        total_cost: f64,
        compute_micros: u64,
        assignments: Vec<AssignmentView>,
    },
    /// Optimize was requested with no available units.
    NoAvailableUnits,
    IncidentContained {
        incident_id: IncidentId,
        released_units: Vec<UnitId>,
    },
    IncidentExtinguished {
        incident_id: IncidentId,
    },
    /// ResolveNext found nothing pending.
    QueueEmpty,
    QueueRescored {
        pending: usize,
    },
    MaintenanceChanged {
        unit_id: UnitId,
        on: bool,
    },
    CommandRejected {
        reason: String,
    },
}
