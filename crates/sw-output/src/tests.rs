//! Integration tests for sw-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{AssignmentRow, TickSummaryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn assignment_row(agent: u32, tick: u64) -> AssignmentRow {
        AssignmentRow {
            tick,
            zone:  "W1N1".into(),
            job:   format!("work#{agent}"),
            kind:  "upgrade",
            agent,
        }
    }

    fn summary_row(tick: u64) -> TickSummaryRow {
        TickSummaryRow {
            tick,
            delayed_fired: 1,
            assignments:   2,
            turns:         3,
            standby:       1,
            flips:         0,
            finished:      0,
            errors:        0,
            pending_jobs:  4,
        }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("assignments.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("assignments.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["tick", "zone", "job", "kind", "agent"]);

        let mut rdr2 = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers2,
            ["tick", "delayed_fired", "assignments", "turns", "standby", "flips", "finished", "errors", "pending_jobs"]
        );
    }

    #[test]
    fn csv_assignment_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_assignments(&[assignment_row(0, 5), assignment_row(1, 5)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("assignments.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "5"); // tick
        assert_eq!(&rows[0][1], "W1N1");
        assert_eq!(&rows[1][2], "work#1");
        assert_eq!(&rows[1][3], "upgrade");
        assert_eq!(&rows[1][4], "1");
    }

    #[test]
    fn csv_tick_summary_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(3)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3"); // tick
        assert_eq!(&rows[0][2], "2"); // assignments
        assert_eq!(&rows[0][8], "4"); // pending_jobs
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batch_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_assignments(&[]).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("nope")).is_err());
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use sw_agent::AgentBuilder;
    use sw_core::{AgentId, ObjectKind, Position, Role, SwarmConfig, ZoneName};
    use sw_path::{AStarRouter, TerrainGrid};
    use sw_sim::{GridWorld, SwarmBuilder, SwarmObserver, TickReport};
    use sw_task::{AddOptions, JobKind, NewJob};

    use crate::observer::SwarmOutputObserver;
    use crate::row::{AssignmentRow, TickSummaryRow};
    use crate::writer::OutputWriter;
    use crate::{CsvWriter, OutputError, OutputResult};

    /// Keeps rows in memory; can be told to fail.
    #[derive(Default)]
    struct VecWriter {
        assignments: Vec<AssignmentRow>,
        summaries:   Vec<TickSummaryRow>,
        finishes:    usize,
        fail:        bool,
    }

    impl OutputWriter for VecWriter {
        fn write_assignments(&mut self, rows: &[AssignmentRow]) -> OutputResult<()> {
            self.assignments.extend_from_slice(rows);
            Ok(())
        }

        fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
            if self.fail {
                return Err(OutputError::Io(std::io::Error::other("disk full")));
            }
            self.summaries.push(*row);
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept() {
        let mut obs = SwarmOutputObserver::new(VecWriter { fail: true, ..VecWriter::default() });
        obs.on_tick_end(&TickReport::new(sw_core::Tick(0)));
        obs.on_tick_end(&TickReport::new(sw_core::Tick(1)));
        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
    }

    #[test]
    fn integration_csv() {
        let mut world = GridWorld::new();
        world.add_zone("W1N1", TerrainGrid::new(20, 20)).unwrap();
        let controller = world.add_object("W1N1", ObjectKind::Controller, Position::new(15, 15)).unwrap();

        let config = SwarmConfig { total_ticks: 4, ..SwarmConfig::default() };
        let mut swarm = SwarmBuilder::new(config, AStarRouter::default(), world)
            .zone("W1N1", Position::new(10, 10))
            .agent(AgentBuilder::new(Role::Worker, "W1N1").spawned())
            .agent(AgentBuilder::new(Role::Worker, "W1N1").spawned())
            .build()
            .unwrap();
        swarm.world.place_agent(AgentId(0), "W1N1", Position::new(2, 2)).unwrap();
        swarm.world.place_agent(AgentId(1), "W1N1", Position::new(3, 2)).unwrap();
        swarm
            .zone_mut(&ZoneName::new("W1N1"))
            .unwrap()
            .board
            .add_job(NewJob::new(JobKind::Upgrade { controller }), AddOptions::default())
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut obs = SwarmOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        swarm.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // need 1 → only the first worker is matched, on tick 0.
        let mut rdr = csv::Reader::from_path(dir.path().join("assignments.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "0");
        assert!(rows[0][2].starts_with("work#"));
        assert_eq!(&rows[0][3], "upgrade");
        assert_eq!(&rows[0][4], "0");

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[3][0], "3");
        assert_eq!(&rows[0][3], "2"); // turns
    }

    #[test]
    fn finish_runs_once_per_run_end() {
        let mut obs = SwarmOutputObserver::new(VecWriter::default());
        obs.on_run_end(sw_core::Tick(3));
        let w = obs.into_writer();
        assert_eq!(w.finishes, 1);
        assert!(w.summaries.is_empty());
    }
}
