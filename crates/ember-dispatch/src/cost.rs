//! Cost model. Prices a (unit, incident) pair and gates it on feasibility.
//!
//! Pure and deterministic: the same unit, incident and clock reading always
//! produce a bit-identical breakdown. No rounding happens here.

use ember_core::config::CostWeights;
use ember_core::enums::UnitStatus;
use ember_core::records::{CostBreakdown, Incident, Unit};
use ember_core::types::{hours_between, Timestamp};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostModel {
    weights: CostWeights,
}

impl CostModel {
    pub fn new(weights: CostWeights) -> Self {
        Self { weights }
    }

    /// Evaluate one candidate pairing at time `now`.
    pub fn evaluate(&self, unit: &Unit, incident: &Incident, now: Timestamp) -> CostBreakdown {
        let w = &self.weights;

        let distance = unit.position.distance_to(&incident.position);
        let travel_time = distance / unit.speed;
        let fuel_cost = distance * w.fuel_per_distance;
        let efficiency = (unit.capacity / incident.required_resources).min(1.0);

        let wind_penalty = incident.wind_factor * w.wind_weight;
        let staleness_penalty = hours_between(incident.detected_at, now) * w.staleness_per_hour;
        let priority_bonus = 1.0 / incident.priority.weight() as f64;

        let base_cost = distance * incident.intensity as f64 / unit.capacity
            + wind_penalty
            + staleness_penalty;
        let total_cost = base_cost * priority_bonus;

        let required_energy = travel_time * w.energy_per_travel_hour
            + incident.estimated_duration * w.energy_per_mission_hour;
        let feasible = required_energy <= unit.energy && unit.status == UnitStatus::Available;

        CostBreakdown {
            distance,
            travel_time,
            fuel_cost,
            efficiency,
            wind_penalty,
            priority_bonus,
            staleness_penalty,
            base_cost,
            total_cost,
            required_energy,
            feasible,
        }
    }
}
