//! Integration tests for ts-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;
    use ts_behavior::{LifecycleState, Status};

    use crate::csv::{CsvWriter, LIFECYCLE_FILE, STATUS_FILE};
    use crate::row::{LifecycleRow, ScenarioStatusRow};
    use crate::writer::OutputWriter;
    use crate::OutputError;

    // ── Helpers ───────────────────────────────────────────────────────────

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn records(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    fn headers(dir: &TempDir, file: &str) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(&dir, STATUS_FILE), ["tick", "scenario", "status"]);
        assert_eq!(headers(&dir, LIFECYCLE_FILE), ["tick", "scenario", "actor", "from", "to"]);
    }

    #[test]
    fn lifecycle_registration_has_empty_from() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_lifecycle(&LifecycleRow { tick: 0, scenario: 1, actor: 7, from: None, to: LifecycleState::SpawnedHidden })
            .unwrap();
        w.write_lifecycle(&LifecycleRow {
            tick:     4,
            scenario: 1,
            actor:    7,
            from:     Some(LifecycleState::SpawnedHidden),
            to:       LifecycleState::VisibleIdle,
        })
        .unwrap();
        w.finish().unwrap();

        let rows = records(&dir, LIFECYCLE_FILE);
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][3], "");
        assert_eq!(&rows[0][4], "spawned_hidden");
        assert_eq!(&rows[1][0], "4");
        assert_eq!(&rows[1][3], "spawned_hidden");
        assert_eq!(&rows[1][4], "visible_idle");
    }

    #[test]
    fn status_rows_use_status_names() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_status(&ScenarioStatusRow { tick: 3, scenario: 2, status: Status::Failure }).unwrap();
        w.finish().unwrap();

        let rows = records(&dir, STATUS_FILE);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "2");
        assert_eq!(&rows[0][2], "FAILURE");
    }

    #[test]
    fn writes_after_finish_are_rejected() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let err = w.write_status(&ScenarioStatusRow { tick: 0, scenario: 0, status: Status::Running }).unwrap_err();
        assert!(matches!(err, OutputError::Finished));
    }
}

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;
    use ts_core::{Location, ModelFilter, Rotation, SimConfig, Transform};
    use ts_scenario::{
        BackgroundConfig, Outcome, RoadFriction, RunnerBuilder, ScenarioKind, WeatherConfig, WeatherPreset,
    };
    use ts_world::SandboxWorldBuilder;

    use crate::csv::{CsvWriter, LIFECYCLE_FILE, STATUS_FILE};
    use crate::observer::TraceObserver;

    // ── Helpers ───────────────────────────────────────────────────────────

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn rows(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    /// Weather (done on tick 0) plus two background vehicles that time out
    /// after 0.5 s.
    fn run_into(dir: &TempDir, changes_only: bool) {
        let world = SandboxWorldBuilder::new(3).ego_route_lane(1).build();
        let config = SimConfig { fixed_delta_secs: 0.1, max_ticks: 100, seed: 3 };
        let ego_pose = Transform::new(Location::new(0.0, 0.0, 0.0), Rotation::default());
        let mut runner = RunnerBuilder::new(config, world)
            .spawn_ego(ModelFilter::parse("vehicle.tesla.model3").unwrap(), ego_pose)
            .scenario(
                ScenarioKind::Weather(WeatherConfig::preset(WeatherPreset::Overcast).with_road_friction(RoadFriction::DRY)),
                None,
            )
            .scenario(ScenarioKind::Background(BackgroundConfig { total: 2, ..BackgroundConfig::default() }), Some(0.5))
            .build()
            .unwrap();

        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = TraceObserver::new(writer);
        if changes_only {
            obs = obs.changes_only();
        }
        let summary = runner.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(summary.count(Outcome::Success), 1);
        assert_eq!(summary.count(Outcome::TimedOut), 1);
    }

    #[test]
    fn every_tick_status_and_every_transition_written() {
        let dir = tmp();
        run_into(&dir, false);

        let status = rows(&dir, STATUS_FILE);
        // Weather: tick 0.  Background: ticks 0..=5.
        assert_eq!(status.len(), 7);
        assert_eq!(status.iter().filter(|r| &r[2] == "SUCCESS").count(), 1);

        let lifecycle = rows(&dir, LIFECYCLE_FILE);
        assert_eq!(lifecycle.len(), 8);
        let removed = lifecycle.iter().filter(|r| &r[4] == "removed").count();
        assert_eq!(removed, 2);
        assert!(lifecycle.iter().all(|r| &r[1] == "1"));
    }

    #[test]
    fn changes_only_collapses_repeated_status() {
        let dir = tmp();
        run_into(&dir, true);

        let status = rows(&dir, STATUS_FILE);
        assert_eq!(status.len(), 2);
        assert_eq!(&status[0][2], "SUCCESS");
        assert_eq!(&status[1][2], "RUNNING");
    }
}
