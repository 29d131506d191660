//! Cost model and fleet policy tuning parameters.
//!
//! These are the defaults behind `DispatchConfig`; a loaded config file may
//! override any of them.

// --- Incident derivations ---

/// Required resources per unit of (intensity × affected area).
pub const RESOURCE_FACTOR: f64 = 10.0;

/// Fixed set-up time of any suppression mission (hours).
pub const DURATION_BASE_HOURS: f64 = 0.25;

/// Additional mission hours per unit of (intensity × affected area).
pub const DURATION_FACTOR: f64 = 0.05;

// --- Cost model ---

/// Cost added per unit of wind factor.
pub const WIND_WEIGHT: f64 = 2.0;

/// Cost added per hour an incident has been waiting since detection.
pub const STALENESS_PER_HOUR: f64 = 1.5;

/// Fuel consumed per distance unit travelled.
pub const FUEL_PER_DISTANCE: f64 = 0.5;

/// Energy drawn per hour of transit.
pub const ENERGY_PER_TRAVEL_HOUR: f64 = 10.0;

/// Energy drawn per hour of on-site suppression.
pub const ENERGY_PER_MISSION_HOUR: f64 = 5.0;

// --- Fleet ---

/// Maximum energy a unit can hold.
pub const MAX_UNIT_ENERGY: f64 = 100.0;

/// Energy drained from each unit released by an incident resolution.
pub const RESOLUTION_ENERGY_DRAIN: f64 = 20.0;

/// Resolution drain never takes a unit below this level.
pub const MIN_ENERGY_FLOOR: f64 = 5.0;

// --- Optimizer ---

/// Default cap on the incidents handed to one optimizer run.
pub const DEFAULT_MAX_INCIDENTS_PER_RUN: usize = 16;

/// Hard limit imposed by the 64-bit claimed-incident mask.
pub const OPTIMIZER_MASK_BITS: usize = 64;
