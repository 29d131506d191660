//! Property-based tests for the assignment optimizer.
//!
//! Small random fleets are checked against an exhaustive enumeration of every
//! possible assignment.

use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use ember_core::config::CostWeights;
use ember_core::enums::{PriorityClass, UnitStatus};
use ember_core::records::{Incident, IncidentSpec, Unit, UnitSpec};
use ember_core::types::{IncidentId, Position, Timestamp, UnitId};
use ember_dispatch::cost::CostModel;
use ember_dispatch::optimizer::{AssignmentOptimizer, AssignmentPlan, OptimizeOutcome};

fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 8, 1, 18, 0, 0).unwrap()
}

// ============================================================================
// GENERATORS
// ============================================================================

fn unit_strategy() -> impl Strategy<Value = (UnitSpec, bool)> {
    (
        0u32..=20,
        0u32..=20,
        1.0f64..100.0,
        1.0f64..2.5,
        30u32..=60,
        prop::bool::weighted(0.15),
    )
        .prop_map(|(x, y, energy, capacity, speed, busy)| {
            (
                UnitSpec {
                    position: Position::new(x as f64, y as f64),
                    energy,
                    capacity,
                    speed: speed as f64,
                },
                busy,
            )
        })
}

fn incident_strategy() -> impl Strategy<Value = IncidentSpec> {
    (
        0u32..=20,
        0u32..=20,
        1u32..=10,
        0.5f64..1.5,
        0usize..3,
        0.5f64..5.0,
        0i64..240,
    )
        .prop_map(|(x, y, intensity, wind_factor, priority, area, age)| IncidentSpec {
            position: Position::new(x as f64, y as f64),
            intensity,
            wind_factor,
            priority: [PriorityClass::Normal, PriorityClass::High, PriorityClass::Critical]
                [priority],
            area,
            detected_at: now() - Duration::minutes(age),
        })
}

fn build(
    units: Vec<(UnitSpec, bool)>,
    incidents: Vec<IncidentSpec>,
) -> (Vec<Unit>, Vec<Incident>) {
    let weights = CostWeights::default();
    let units = units
        .into_iter()
        .enumerate()
        .map(|(n, (spec, busy))| {
            let mut unit = Unit::new(UnitId(n as u32), spec);
            if busy {
                unit.status = UnitStatus::OnMission;
            }
            unit
        })
        .collect();
    let incidents = incidents
        .into_iter()
        .enumerate()
        .map(|(n, spec)| Incident::new(IncidentId(n as u32), spec, &weights))
        .collect();
    (units, incidents)
}

// ============================================================================
// REFERENCE
// ============================================================================

/// Best (served, cost) over every assignment, by exhaustive enumeration.
fn brute_force(matrix: &[Vec<(bool, f64)>], unit: usize, used: &mut Vec<bool>) -> (usize, f64) {
    if unit == matrix.len() {
        return (0, 0.0);
    }
    let mut best = brute_force(matrix, unit + 1, used);
    for (incident, &(feasible, cost)) in matrix[unit].iter().enumerate() {
        if used[incident] || !feasible {
            continue;
        }
        used[incident] = true;
        let (served, rest) = brute_force(matrix, unit + 1, used);
        used[incident] = false;
        let candidate = (served + 1, cost + rest);
        if candidate.0 > best.0 || (candidate.0 == best.0 && candidate.1 < best.1) {
            best = candidate;
        }
    }
    best
}

fn plan_of(outcome: OptimizeOutcome) -> AssignmentPlan {
    match outcome {
        OptimizeOutcome::Planned(plan) => plan,
        OptimizeOutcome::NoAvailableUnits => AssignmentPlan::default(),
    }
}

// ============================================================================
// OPTIMIZER PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn plan_matches_exhaustive_search(
        units in prop::collection::vec(unit_strategy(), 1..=4),
        incidents in prop::collection::vec(incident_strategy(), 1..=5),
    ) {
        let (units, incidents) = build(units, incidents);
        let model = CostModel::default();
        let matrix: Vec<Vec<(bool, f64)>> = units
            .iter()
            .map(|u| {
                incidents
                    .iter()
                    .map(|i| {
                        let c = model.evaluate(u, i, now());
                        (c.feasible, c.total_cost)
                    })
                    .collect()
            })
            .collect();
        let (served, cost) = brute_force(&matrix, 0, &mut vec![false; incidents.len()]);

        let mut optimizer = AssignmentOptimizer::new();
        let plan = plan_of(optimizer.optimize(&incidents, &units, &model, now()).unwrap());

        prop_assert_eq!(plan.assignments.len(), served);
        prop_assert!(
            (plan.total_cost - cost).abs() < 1e-6,
            "optimizer cost {} != exhaustive cost {}",
            plan.total_cost,
            cost
        );
    }

    #[test]
    fn plan_is_unique_and_feasible(
        units in prop::collection::vec(unit_strategy(), 0..=5),
        incidents in prop::collection::vec(incident_strategy(), 0..=5),
    ) {
        let (units, incidents) = build(units, incidents);
        let model = CostModel::default();
        let mut optimizer = AssignmentOptimizer::new();
        let outcome = optimizer.optimize(&incidents, &units, &model, now()).unwrap();

        if units.is_empty() && !incidents.is_empty() {
            prop_assert_eq!(outcome, OptimizeOutcome::NoAvailableUnits);
            return Ok(());
        }
        let plan = plan_of(outcome);

        let mut seen_units = HashSet::new();
        let mut seen_incidents = HashSet::new();
        for a in &plan.assignments {
            prop_assert!(seen_units.insert(a.unit_id), "unit {} assigned twice", a.unit_id);
            prop_assert!(seen_incidents.insert(a.incident_index), "incident assigned twice");
            prop_assert!(a.breakdown.feasible);
            prop_assert_eq!(incidents[a.incident_index].id, a.incident_id);

            let unit = units.iter().find(|u| u.id == a.unit_id).unwrap();
            prop_assert_eq!(unit.status, UnitStatus::Available);
            prop_assert!(a.breakdown.required_energy <= unit.energy);
            prop_assert_eq!(
                a.breakdown,
                model.evaluate(unit, &incidents[a.incident_index], now())
            );
        }

        let sum: f64 = plan.assignments.iter().map(|a| a.breakdown.total_cost).sum();
        prop_assert_eq!(plan.total_cost, sum);
        prop_assert!(plan.assignments.len() <= units.len().min(incidents.len()));
    }

    #[test]
    fn repeated_runs_agree(
        units in prop::collection::vec(unit_strategy(), 1..=4),
        incidents in prop::collection::vec(incident_strategy(), 1..=4),
    ) {
        let (units, incidents) = build(units, incidents);
        let model = CostModel::default();
        let mut optimizer = AssignmentOptimizer::new();
        let first = plan_of(optimizer.optimize(&incidents, &units, &model, now()).unwrap());
        let second = plan_of(optimizer.optimize(&incidents, &units, &model, now()).unwrap());
        prop_assert_eq!(first, second);
    }
}
