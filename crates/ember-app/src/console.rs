//! Console rendering of fleet state and dispatch events. Figures are shown to
//! two decimals.

use std::fmt::Write;

use ember_core::events::DispatchEvent;
use ember_core::records::{Incident, Unit};
use ember_core::state::{AssignmentView, FleetReport};

/// `D0 -> F2 (cost 3.25)` lines followed by the plan total.
pub fn format_allocations(assignments: &[AssignmentView], total_cost: f64) -> String {
    let mut out = String::from("Allocations:\n");
    if assignments.is_empty() {
        out.push_str("  (none)\n");
    }
    for a in assignments {
        let _ = writeln!(out, "  {} -> {} (cost {:.2})", a.unit_id, a.incident_id, a.cost);
    }
    let _ = writeln!(out, "Total cost: {total_cost:.2}");
    out
}

pub fn format_event(event: &DispatchEvent) -> String {
    match event {
        DispatchEvent::UnitRegistered { unit_id } => format!("Unit {unit_id} registered\n"),
        DispatchEvent::IncidentReported { incident_id, score } => {
            format!("Incident {incident_id} reported (score {score:.2})\n")
        }
        DispatchEvent::UnitsDispatched {
            total_cost,
            compute_micros,
            assignments,
        } => {
            let mut out = format_allocations(assignments, *total_cost);
            let _ = writeln!(out, "Computed in {:.2} ms", *compute_micros as f64 / 1000.0);
            out
        }
        DispatchEvent::NoAvailableUnits => "No available units, incidents left pending\n".into(),
        DispatchEvent::IncidentContained {
            incident_id,
            released_units,
        } => {
            let released: Vec<String> = released_units.iter().map(ToString::to_string).collect();
            if released.is_empty() {
                format!("Incident {incident_id} contained\n")
            } else {
                format!(
                    "Incident {incident_id} contained, released {}\n",
                    released.join(", ")
                )
            }
        }
        DispatchEvent::IncidentExtinguished { incident_id } => {
            format!("Incident {incident_id} extinguished\n")
        }
        DispatchEvent::QueueEmpty => "Incident queue is empty\n".into(),
        DispatchEvent::QueueRescored { pending } => {
            format!("Queue rescored, {pending} pending\n")
        }
        DispatchEvent::MaintenanceChanged { unit_id, on } => {
            let state = if *on { "entered" } else { "left" };
            format!("Unit {unit_id} {state} maintenance\n")
        }
        DispatchEvent::CommandRejected { reason } => format!("Command rejected: {reason}\n"),
    }
}

pub fn format_units<'a>(units: impl IntoIterator<Item = &'a Unit>) -> String {
    let mut out = format!(
        "{:<5} {:>14} {:>8} {:>8} {:>7} {:<11} {:>8}\n",
        "unit", "position", "energy", "capacity", "speed", "status", "missions"
    );
    for u in units {
        let _ = writeln!(
            out,
            "{:<5} {:>14} {:>8.2} {:>8.2} {:>7.2} {:<11} {:>8}",
            u.id.to_string(),
            format!("({:.2}, {:.2})", u.position.x, u.position.y),
            u.energy,
            u.capacity,
            u.speed,
            format!("{:?}", u.status),
            u.missions.len()
        );
    }
    out
}

pub fn format_incidents<'a>(incidents: impl IntoIterator<Item = &'a Incident>) -> String {
    let mut out = format!(
        "{:<5} {:>14} {:>9} {:>5} {:<9} {:>6} {:<13} {}\n",
        "fire", "position", "intensity", "wind", "priority", "area", "status", "responders"
    );
    for i in incidents {
        let responders: Vec<String> = i.responders.iter().map(ToString::to_string).collect();
        let _ = writeln!(
            out,
            "{:<5} {:>14} {:>9} {:>5.2} {:<9} {:>6.2} {:<13} {}",
            i.id.to_string(),
            format!("({:.2}, {:.2})", i.position.x, i.position.y),
            i.intensity,
            i.wind_factor,
            i.priority.label(),
            i.area,
            format!("{:?}", i.status),
            if responders.is_empty() {
                "-".to_string()
            } else {
                responders.join(",")
            }
        );
    }
    out
}

pub fn format_report(report: &FleetReport) -> String {
    format!(
        "Units: {} available, {} on mission, {} in maintenance\n\
         Incidents: {} active, {} contained, {} extinguished\n\
         Operations: {}\n\
         Resources consumed: {:.2}\n",
        report.units_available,
        report.units_on_mission,
        report.units_maintenance,
        report.incidents_active,
        report.incidents_contained,
        report.incidents_extinguished,
        report.operations,
        report.resources_consumed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ember_core::config::CostWeights;
    use ember_core::enums::PriorityClass;
    use ember_core::records::{IncidentSpec, UnitSpec};
    use ember_core::types::{IncidentId, Position, UnitId};

    #[test]
    fn test_allocations_are_rounded() {
        let views = vec![
            AssignmentView::new(UnitId(0), IncidentId(2), 3.14159),
            AssignmentView::new(UnitId(3), IncidentId(1), 10.0),
        ];
        let text = format_allocations(&views, 13.14159);
        assert_eq!(
            text,
            "Allocations:\n  D0 -> F2 (cost 3.14)\n  D3 -> F1 (cost 10.00)\nTotal cost: 13.14\n"
        );
    }

    #[test]
    fn test_empty_allocation() {
        let text = format_allocations(&[], 0.0);
        assert!(text.contains("(none)"));
        assert!(text.ends_with("Total cost: 0.00\n"));
    }

    #[test]
    fn test_event_lines() {
        let contained = format_event(&DispatchEvent::IncidentContained {
            incident_id: IncidentId(4),
            released_units: vec![UnitId(1), UnitId(2)],
        });
        assert_eq!(contained, "Incident F4 contained, released D1, D2\n");

        let dispatched = format_event(&DispatchEvent::UnitsDispatched {
            total_cost: 2.0,
            compute_micros: 1500,
            assignments: vec![AssignmentView::new(UnitId(0), IncidentId(0), 2.0)],
        });
        assert!(dispatched.contains("D0 -> F0 (cost 2.00)"));
        assert!(dispatched.contains("Computed in 1.50 ms"));

        assert_eq!(
            format_event(&DispatchEvent::CommandRejected {
                reason: "unknown unit D9".into()
            }),
            "Command rejected: unknown unit D9\n"
        );
    }

    #[test]
    fn test_tables() {
        let unit = Unit::new(
            UnitId(0),
            UnitSpec {
                position: Position::new(1.0, 2.5),
                energy: 87.5,
                capacity: 1.25,
                speed: 45.0,
            },
        );
        let units = format_units([&unit]);
        let row = units.lines().nth(1).unwrap();
        assert!(row.starts_with("D0"));
        assert!(row.contains("(1.00, 2.50)"));
        assert!(row.contains("87.50"));
        assert!(row.contains("Available"));

        let incident = Incident::new(
            IncidentId(7),
            IncidentSpec {
                position: Position::new(4.0, 4.0),
                intensity: 6,
                wind_factor: 1.2,
                priority: PriorityClass::High,
                area: 2.0,
                detected_at: Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap(),
            },
            &CostWeights::default(),
        );
        let incidents = format_incidents([&incident]);
        let row = incidents.lines().nth(1).unwrap();
        assert!(row.starts_with("F7"));
        assert!(row.contains("High"));
        assert!(row.contains("Active"));
        assert!(row.ends_with('-'));
    }

    #[test]
    fn test_report_text() {
        let report = FleetReport {
            units_available: 2,
            units_on_mission: 1,
            incidents_active: 3,
            operations: 1,
            resources_consumed: 4.567,
            ..Default::default()
        };
        let text = format_report(&report);
        assert!(text.contains("2 available, 1 on mission, 0 in maintenance"));
        assert!(text.contains("3 active, 0 contained, 0 extinguished"));
        assert!(text.contains("Resources consumed: 4.57"));
    }
}
