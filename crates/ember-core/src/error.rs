//! Error types for the dispatcher and its configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::enums::{IncidentStatus, UnitStatus};
use crate::types::{IncidentId, UnitId};

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors surfaced by the dispatch core.
///
/// Recoverable conditions (no available units, infeasible pairs, an empty
/// queue) are not errors; they are typed results. `InvariantViolation` means a
/// caller bypassed the store's mutation discipline and should be treated as fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    #[error("unknown incident {0}")]
    UnknownIncident(IncidentId),
    #[error("incident {id} is {status:?}, expected {expected:?}")]
    IncidentStatusMismatch {
        id: IncidentId,
        status: IncidentStatus,
        expected: IncidentStatus,
    },
    #[error("unit {id} is {status:?} and cannot change maintenance state")]
    UnitBusy { id: UnitId, status: UnitStatus },
    #[error("invalid incident: {0}")]
    InvalidIncident(String),
    #[error("invalid unit: {0}")]
    InvalidUnit(String),
    #[error("{count} incidents exceed the optimizer limit of {max}")]
    IncidentSetTooLarge { count: usize, max: usize },
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Errors raised while loading or validating a `DispatchConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
