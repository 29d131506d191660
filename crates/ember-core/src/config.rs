//! Dispatcher configuration: cost weights, fleet policy and optimizer limits.
//!
//! Every section deserializes with defaults, so a config file only needs the
//! fields it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Weights of the cost model and the incident derivations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    pub resource_factor: f64,
    pub duration_base_hours: f64,
    pub duration_factor: f64,
    pub wind_weight: f64,
    pub staleness_per_hour: f64,
    pub fuel_per_distance: f64,
    pub energy_per_travel_hour: f64,
    pub energy_per_mission_hour: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            resource_factor: RESOURCE_FACTOR,
            duration_base_hours: DURATION_BASE_HOURS,
            duration_factor: DURATION_FACTOR,
            wind_weight: WIND_WEIGHT,
            staleness_per_hour: STALENESS_PER_HOUR,
            fuel_per_distance: FUEL_PER_DISTANCE,
            energy_per_travel_hour: ENERGY_PER_TRAVEL_HOUR,
            energy_per_mission_hour: ENERGY_PER_MISSION_HOUR,
        }
    }
}

/// Energy bookkeeping applied by the state store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetPolicy {
    pub max_energy: f64,
    pub resolution_drain: f64,
    pub energy_floor: f64,
}

impl Default for FleetPolicy {
    fn default() -> Self {
        Self {
            max_energy: MAX_UNIT_ENERGY,
            resolution_drain: RESOLUTION_ENERGY_DRAIN,
            energy_floor: MIN_ENERGY_FLOOR,
        }
    }
}

/// Bounds the engine applies before invoking the exponential optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerLimits {
    pub max_incidents_per_run: usize,
    /// Whether incidents that already have a responder stay eligible.
    pub allow_reinforcement: bool,
}

impl Default for OptimizerLimits {
    fn default() -> Self {
        Self {
            max_incidents_per_run: DEFAULT_MAX_INCIDENTS_PER_RUN,
            allow_reinforcement: false,
        }
    }
}

/// Complete dispatcher configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub cost: CostWeights,
    pub fleet: FleetPolicy,
    pub limits: OptimizerLimits,
}

impl DispatchConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DispatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.cost;
        let non_negative = [
            ("duration_base_hours", c.duration_base_hours),
            ("duration_factor", c.duration_factor),
            ("wind_weight", c.wind_weight),
            ("staleness_per_hour", c.staleness_per_hour),
            ("fuel_per_distance", c.fuel_per_distance),
            ("energy_per_travel_hour", c.energy_per_travel_hour),
            ("energy_per_mission_hour", c.energy_per_mission_hour),
            ("resolution_drain", self.fleet.resolution_drain),
            ("energy_floor", self.fleet.energy_floor),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !c.resource_factor.is_finite() || c.resource_factor <= 0.0 {
            return Err(ConfigError::Invalid(
                "resource_factor must be positive".into(),
            ));
        }
        if !self.fleet.max_energy.is_finite() || self.fleet.max_energy <= 0.0 {
            return Err(ConfigError::Invalid("max_energy must be positive".into()));
        }
        if self.fleet.energy_floor > self.fleet.max_energy {
            return Err(ConfigError::Invalid(
                "energy_floor cannot exceed max_energy".into(),
            ));
        }
        let cap = self.limits.max_incidents_per_run;
        if cap == 0 || cap > OPTIMIZER_MASK_BITS {
            return Err(ConfigError::Invalid(format!(
                "max_incidents_per_run must be in 1..={OPTIMIZER_MASK_BITS}, got {cap}"
            )));
        }
        Ok(())
    }
}
