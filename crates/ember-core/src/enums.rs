//! Enumeration types used throughout the dispatcher.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a response unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    /// Idle and eligible for assignment.
    #[default]
    Available,
    /// Dispatched to an incident.
    OnMission,
    /// Withdrawn by an operator. Never set by the optimizer.
    Maintenance,
}

impl UnitStatus {
    /// Transition taken when the unit is assigned to an incident.
    pub fn dispatch(self) -> Option<UnitStatus> {
        match self {
            UnitStatus::Available => Some(UnitStatus::OnMission),
            UnitStatus::OnMission | UnitStatus::Maintenance => None,
        }
    }

    /// Transition taken when the unit's incident is resolved.
    pub fn release(self) -> Option<UnitStatus> {
        match self {
            UnitStatus::OnMission => Some(UnitStatus::Available),
            UnitStatus::Available | UnitStatus::Maintenance => None,
        }
    }

    /// Operator override in or out of maintenance.
    pub fn set_maintenance(self, on: bool) -> Option<UnitStatus> {
        match (self, on) {
            (UnitStatus::Available, true) => Some(UnitStatus::Maintenance),
            (UnitStatus::Maintenance, false) => Some(UnitStatus::Available),
            (UnitStatus::Available, false) | (UnitStatus::Maintenance, true) => Some(self),
            (UnitStatus::OnMission, _) => None,
        }
    }
}

/// Lifecycle state of an incident. Monotone: Active → Contained → Extinguished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IncidentStatus {
    #[default]
    Active,
    Contained,
    Extinguished,
}

impl IncidentStatus {
    /// Next state in the lifecycle, or `None` once extinguished.
    pub fn advance(self) -> Option<IncidentStatus> {
        match self {
            IncidentStatus::Active => Some(IncidentStatus::Contained),
            IncidentStatus::Contained => Some(IncidentStatus::Extinguished),
            IncidentStatus::Extinguished => None,
        }
    }
}

/// Urgency class of an incident. Higher = more urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PriorityClass {
    #[default]
    Normal,
    High,
    Critical,
}

impl PriorityClass {
    /// Numeric weight used by the queue score and the cost model's urgency bonus.
    pub fn weight(self) -> u32 {
        match self {
            PriorityClass::Normal => 1,
            PriorityClass::High => 2,
            PriorityClass::Critical => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityClass::Normal => "Normal",
            PriorityClass::High => "High",
            PriorityClass::Critical => "Critical",
        }
    }
}
