//! Dispatch loop thread. Owns the engine and serializes every mutation.
//!
//! Commands arrive via `mpsc` channel and are queued on the engine; each cycle
//! runs one tick, forwards the resulting events and publishes the latest
//! report for synchronous polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use ember_core::error::Result as DispatchResult;
use ember_core::events::DispatchEvent;
use ember_core::state::{FleetReport, FleetSnapshot};
use ember_dispatch::DispatchEngine;

use crate::error::AppError;
use crate::state::{LoopCommand, LoopHandle};

/// Spawns the dispatch loop in a new thread, moving `engine` into it.
pub fn spawn_dispatch_loop(engine: DispatchEngine, cycle: Duration) -> Result<LoopHandle, AppError> {
    let (command_tx, command_rx) = mpsc::channel::<LoopCommand>();
    let (event_tx, event_rx) = mpsc::channel::<DispatchEvent>();
    let latest_report = Arc::new(Mutex::new(None));

    let shared = Arc::clone(&latest_report);
    let thread = std::thread::Builder::new()
        .name("ember-dispatch-loop".into())
        .spawn(move || run_dispatch_loop(engine, command_rx, event_tx, &shared, cycle))
        .map_err(AppError::Spawn)?;

    Ok(LoopHandle {
        command_tx,
        event_rx,
        latest_report,
        thread,
    })
}

/// The dispatch loop. Runs until Shutdown, channel disconnect or an
/// invariant violation.
fn run_dispatch_loop(
    mut engine: DispatchEngine,
    command_rx: mpsc::Receiver<LoopCommand>,
    event_tx: mpsc::Sender<DispatchEvent>,
    latest_report: &Mutex<Option<FleetReport>>,
    cycle: Duration,
) -> DispatchResult<FleetSnapshot> {
    let mut next_cycle = Instant::now();
    let mut cycles: u64 = 0;

    loop {
        // 1. Drain all pending commands
        let mut stopping = false;
        loop {
            match command_rx.try_recv() {
                Ok(LoopCommand::Dispatch(command)) => engine.queue_command(command),
                Ok(LoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    stopping = true;
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Process them
        let events = engine.tick()?;
        cycles += 1;
        if !events.is_empty() {
            debug!(cycle = cycles, events = events.len(), "tick");
        }

        // 3. Forward events; a dropped receiver only means nobody is listening
        for event in events {
            let _ = event_tx.send(event);
        }

        // 4. Store latest report for synchronous polling
        if let Ok(mut lock) = latest_report.lock() {
            *lock = Some(engine.report());
        }

        if stopping {
            info!(cycles, "dispatch loop stopped");
            return Ok(engine.snapshot());
        }

        // 5. Sleep until the next cycle
        next_cycle += cycle;
        let now = Instant::now();
        if next_cycle > now {
            std::thread::sleep(next_cycle - now);
        } else if now - next_cycle > cycle * 2 {
            // Too far behind, skip the missed cycles
            next_cycle = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ember_core::commands::DispatchCommand;
    use ember_core::config::DispatchConfig;
    use ember_core::enums::{PriorityClass, UnitStatus};
    use ember_core::records::{IncidentSpec, UnitSpec};
    use ember_core::types::{IncidentId, Position, UnitId};
    use ember_dispatch::clock::ManualClock;

    fn engine() -> DispatchEngine {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap());
        DispatchEngine::with_clock(DispatchConfig::default(), Box::new(clock))
    }

    fn unit_spec() -> UnitSpec {
        UnitSpec {
            position: Position::new(0.0, 0.0),
            energy: 100.0,
            capacity: 2.0,
            speed: 40.0,
        }
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();

        tx.send(LoopCommand::Dispatch(DispatchCommand::Optimize))
            .unwrap();
        tx.send(LoopCommand::Dispatch(DispatchCommand::ResolveNext))
            .unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();

        let commands: Vec<LoopCommand> = rx.try_iter().collect();
        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            LoopCommand::Dispatch(DispatchCommand::Optimize)
        ));
        assert!(matches!(
            commands[1],
            LoopCommand::Dispatch(DispatchCommand::ResolveNext)
        ));
        assert!(matches!(commands[2], LoopCommand::Shutdown));
    }

    #[test]
    fn test_loop_runs_commands_and_shuts_down() {
        let handle = spawn_dispatch_loop(engine(), Duration::from_millis(1)).unwrap();
        handle
            .send_all([
                DispatchCommand::RegisterUnit { spec: unit_spec() },
                DispatchCommand::ReportIncident {
                    spec: IncidentSpec {
                        position: Position::new(3.0, 4.0),
                        intensity: 2,
                        wind_factor: 1.0,
                        priority: PriorityClass::High,
                        area: 1.0,
                        detected_at: Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap(),
                    },
                },
                DispatchCommand::Optimize,
            ])
            .unwrap();
        handle.shutdown();

        let events: Vec<DispatchEvent> = handle.events().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], DispatchEvent::UnitRegistered { unit_id: UnitId(0) });
        match &events[2] {
            DispatchEvent::UnitsDispatched { assignments, .. } => {
                assert_eq!(assignments.len(), 1);
                assert_eq!(assignments[0].incident_id, IncidentId(0));
            }
            other => panic!("unexpected event {other:?}"),
        }

        let report = handle.latest_report().unwrap();
        assert_eq!(report.units_on_mission, 1);

        let snapshot = handle.join().unwrap();
        assert_eq!(snapshot.units[0].status, UnitStatus::OnMission);
        assert_eq!(snapshot.report, report);
    }

    #[test]
    fn test_dropped_handle_stops_loop() {
        let handle = spawn_dispatch_loop(engine(), Duration::from_millis(1)).unwrap();
        let LoopHandle {
            command_tx, thread, ..
        } = handle;
        drop(command_tx);
        let snapshot = thread.join().unwrap().unwrap();
        assert!(snapshot.units.is_empty());
        assert_eq!(snapshot.report.operations, 0);
    }
}
