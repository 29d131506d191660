//! JSON snapshots of the fleet state store.

use std::fs;
use std::path::Path;

use ember_core::state::FleetSnapshot;

use crate::error::AppError;

pub fn save_snapshot(path: &Path, snapshot: &FleetSnapshot) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| AppError::SnapshotIo {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).map_err(|source| AppError::SnapshotIo {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_snapshot(path: &Path) -> Result<FleetSnapshot, AppError> {
    let json = fs::read_to_string(path).map_err(|source| AppError::SnapshotIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ember_core::config::DispatchConfig;
    use ember_dispatch::clock::ManualClock;
    use ember_dispatch::scenario::{self, ScenarioSpec};
    use ember_dispatch::DispatchEngine;

    #[test]
    fn save_and_load_file() {
        let dir = std::env::temp_dir().join("ember_test_snapshot");
        let _ = fs::remove_dir_all(&dir);

        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0).unwrap());
        let mut engine = DispatchEngine::with_clock(DispatchConfig::default(), Box::new(clock));
        scenario::populate(&mut engine, &ScenarioSpec::default()).unwrap();
        engine.optimize().unwrap();
        let snapshot = engine.snapshot();

        let path = dir.join("nested").join("fleet.json");
        save_snapshot(&path, &snapshot).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.taken_at, snapshot.taken_at);
        assert_eq!(loaded.units.len(), snapshot.units.len());
        for (a, b) in loaded.units.iter().zip(&snapshot.units) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.status, b.status);
            assert_eq!(a.missions.len(), b.missions.len());
        }
        let responders: Vec<_> = loaded.incidents.iter().map(|i| &i.responders).collect();
        let expected: Vec<_> = snapshot.incidents.iter().map(|i| &i.responders).collect();
        assert_eq!(responders, expected);
        assert_eq!(loaded.report.units_on_mission, snapshot.report.units_on_mission);
        assert_eq!(loaded.operations.len(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file() {
        let path = std::env::temp_dir().join("ember_test_snapshot_missing.json");
        let _ = fs::remove_file(&path);
        assert!(matches!(
            load_snapshot(&path),
            Err(AppError::SnapshotIo { .. })
        ));
    }
}
