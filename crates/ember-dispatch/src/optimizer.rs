//! Exact assignment optimizer: memoized search over (claimed-incident mask,
//! remaining-unit suffix).
//!
//! Units are decided one at a time: the current unit is tried against every
//! unclaimed feasible incident in index order, then left idle. Plans are ranked
//! by incidents served (more is better), then by total cost (lower is better).
//! Comparisons are strict, so the first-explored optimum wins ties.
//!
//! Exponential in the number of incidents. Callers cap the input size.

use std::borrow::Borrow;
use std::collections::HashMap;

use tracing::debug;

use ember_core::constants::OPTIMIZER_MASK_BITS;
use ember_core::error::{DispatchError, Result};
use ember_core::records::{CostBreakdown, Incident, Unit};
use ember_core::types::{IncidentId, Timestamp, UnitId};

use crate::cost::CostModel;

/// One unit dispatched to one incident.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub unit_id: UnitId,
    /// Position of the incident in the optimizer's input slice.
    pub incident_index: usize,
    pub incident_id: IncidentId,
    pub breakdown: CostBreakdown,
}

/// A complete proposed assignment. Not yet applied to any state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentPlan {
    /// Sum of every assignment's `breakdown.total_cost`.
    pub total_cost: f64,
    pub assignments: Vec<Assignment>,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeOutcome {
    Planned(AssignmentPlan),
    /// There were incidents to serve but no units to serve them.
    NoAvailableUnits,
}

/// Best continuation from one search state.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SubPlan {
    served: usize,
    cost: f64,
    /// Incident chosen for the unit at this state, `None` for idle.
    choice: Option<usize>,
}

impl SubPlan {
    const EMPTY: SubPlan = SubPlan {
        served: 0,
        cost: 0.0,
        choice: None,
    };

    fn beats(&self, other: &SubPlan) -> bool {
        self.served > other.served || (self.served == other.served && self.cost < other.cost)
    }
}

/// Memo table for one optimizer invocation. Owned by the caller through
/// `AssignmentOptimizer` and cleared before every top-level run.
#[derive(Debug, Default)]
pub struct OptimizerCache {
    entries: HashMap<(u64, usize), SubPlan>,
    hits: u64,
    misses: u64,
}

impl OptimizerCache {
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[derive(Debug, Default)]
pub struct AssignmentOptimizer {
    cache: OptimizerCache,
}

impl AssignmentOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache state left by the most recent run.
    pub fn cache(&self) -> &OptimizerCache {
        &self.cache
    }

    /// Find the best assignment of `units` to `incidents` at time `now`.
    ///
    /// An empty incident set yields an empty plan regardless of the units.
    pub fn optimize<I, U>(
        &mut self,
        incidents: &[I],
        units: &[U],
        model: &CostModel,
        now: Timestamp,
    ) -> Result<OptimizeOutcome>
    where
        I: Borrow<Incident>,
        U: Borrow<Unit>,
    {
        self.cache.clear();
        let incidents: Vec<&Incident> = incidents.iter().map(Borrow::borrow).collect();
        let units: Vec<&Unit> = units.iter().map(Borrow::borrow).collect();

        if incidents.is_empty() {
            return Ok(OptimizeOutcome::Planned(AssignmentPlan::default()));
        }
        if units.is_empty() {
            return Ok(OptimizeOutcome::NoAvailableUnits);
        }
        if incidents.len() > OPTIMIZER_MASK_BITS {
            return Err(DispatchError::IncidentSetTooLarge {
                count: incidents.len(),
                max: OPTIMIZER_MASK_BITS,
            });
        }

        let matrix: Vec<Vec<CostBreakdown>> = units
            .iter()
            .map(|unit| {
                incidents
                    .iter()
                    .map(|incident| model.evaluate(unit, incident, now))
                    .collect()
            })
            .collect();

        let full_mask = if incidents.len() == OPTIMIZER_MASK_BITS {
            u64::MAX
        } else {
            (1u64 << incidents.len()) - 1
        };

        let mut search = Search {
            matrix: &matrix,
            full_mask,
            cache: &mut self.cache,
        };
        let best = search.best(0, 0);

        let mut assignments = Vec::with_capacity(best.served);
        let mut mask = 0u64;
        for (unit_index, unit) in units.iter().enumerate() {
            if mask == full_mask {
                break;
            }
            let Some(step) = self.cache.entries.get(&(mask, unit_index)) else {
                break;
            };
            if let Some(incident_index) = step.choice {
                assignments.push(Assignment {
                    unit_id: unit.id,
                    incident_index,
                    incident_id: incidents[incident_index].id,
                    breakdown: matrix[unit_index][incident_index],
                });
                mask |= 1 << incident_index;
            }
        }

        let total_cost = assignments.iter().map(|a| a.breakdown.total_cost).sum();
        debug!(
            units = units.len(),
            incidents = incidents.len(),
            served = assignments.len(),
            states = self.cache.len(),
            hits = self.cache.hits,
            misses = self.cache.misses,
            "optimizer search complete"
        );

        Ok(OptimizeOutcome::Planned(AssignmentPlan {
            total_cost,
            assignments,
            cache_hits: self.cache.hits,
            cache_misses: self.cache.misses,
        }))
    }
}

struct Search<'a> {
    /// Candidate costs, indexed `[unit][incident]`.
    matrix: &'a [Vec<CostBreakdown>],
    full_mask: u64,
    cache: &'a mut OptimizerCache,
}

impl Search<'_> {
    fn best(&mut self, mask: u64, unit_index: usize) -> SubPlan {
        if unit_index == self.matrix.len() || mask == self.full_mask {
            return SubPlan::EMPTY;
        }
        if let Some(hit) = self.cache.entries.get(&(mask, unit_index)) {
            self.cache.hits += 1;
            return *hit;
        }
        self.cache.misses += 1;

        let matrix = self.matrix;
        let mut best: Option<SubPlan> = None;
        for (incident_index, candidate) in matrix[unit_index].iter().enumerate() {
            let bit = 1u64 << incident_index;
            if mask & bit != 0 || !candidate.feasible {
                continue;
            }
            let rest = self.best(mask | bit, unit_index + 1);
            let plan = SubPlan {
                served: rest.served + 1,
                cost: candidate.total_cost + rest.cost,
                choice: Some(incident_index),
            };
            if best.map_or(true, |b| plan.beats(&b)) {
                best = Some(plan);
            }
        }

        let rest = self.best(mask, unit_index + 1);
        let idle = SubPlan {
            choice: None,
            ..rest
        };
        let best = match best {
            Some(b) if !idle.beats(&b) => b,
            _ => idle,
        };

        self.cache.entries.insert((mask, unit_index), best);
        best
    }
}
