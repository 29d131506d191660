//! Seeded scenario generation: synthetic fleets and fire foci for drivers
//! and tests. Same seed, same scenario.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use ember_core::enums::PriorityClass;
use ember_core::error::Result;
use ember_core::records::{IncidentSpec, UnitSpec};
use ember_core::types::{round2, IncidentId, Position, Timestamp, UnitId};

use crate::engine::DispatchEngine;

/// Parameters for a generated scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioSpec {
    pub seed: u64,
    pub units: usize,
    pub incidents: usize,
    /// Positions are integer grid points in `0..=grid_size` on both axes.
    pub grid_size: u32,
}

impl Default for ScenarioSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            units: 4,
            incidents: 4,
            grid_size: 20,
        }
    }
}

/// Generated attribute sets, not yet registered anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub units: Vec<UnitSpec>,
    pub incidents: Vec<IncidentSpec>,
}

/// Generate unit and incident attributes. Incidents are stamped `detected_at`.
pub fn generate(spec: &ScenarioSpec, detected_at: Timestamp) -> Scenario {
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);

    let units = (0..spec.units)
        .map(|_| UnitSpec {
            position: random_grid_point(&mut rng, spec.grid_size),
            energy: rng.gen_range(60..=100) as f64,
            capacity: round2(rng.gen_range(1.0..2.5)),
            speed: rng.gen_range(30..=60) as f64,
        })
        .collect();

    let incidents = (0..spec.incidents)
        .map(|_| IncidentSpec {
            position: random_grid_point(&mut rng, spec.grid_size),
            intensity: rng.gen_range(1..=10),
            wind_factor: round2(rng.gen_range(0.5..1.5)),
            priority: if rng.gen_bool(0.5) {
                PriorityClass::High
            } else {
                PriorityClass::Normal
            },
            area: round2(rng.gen_range(0.5..5.0)),
            detected_at,
        })
        .collect();

    Scenario { units, incidents }
}

/// Generate a scenario and register it with `engine`, stamped with the
/// engine's current time.
pub fn populate(
    engine: &mut DispatchEngine,
    spec: &ScenarioSpec,
) -> Result<(Vec<UnitId>, Vec<IncidentId>)> {
    let scenario = generate(spec, engine.now());
    let unit_ids = scenario
        .units
        .into_iter()
        .map(|unit| engine.register_unit(unit))
        .collect::<Result<Vec<_>>>()?;
    let incident_ids = scenario
        .incidents
        .into_iter()
        .map(|incident| engine.insert_incident(incident))
        .collect::<Result<Vec<_>>>()?;
    Ok((unit_ids, incident_ids))
}

fn random_grid_point(rng: &mut ChaCha8Rng, grid_size: u32) -> Position {
    Position::new(
        rng.gen_range(0..=grid_size) as f64,
        rng.gen_range(0..=grid_size) as f64,
    )
}
