//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `scenario_status.csv`
//! - `lifecycle_events.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;
use tracing::debug;

use crate::writer::OutputWriter;
use crate::{LifecycleRow, OutputError, OutputResult, ScenarioStatusRow};

pub const STATUS_FILE: &str = "scenario_status.csv";
pub const LIFECYCLE_FILE: &str = "lifecycle_events.csv";

pub struct CsvWriter {
    status:    Writer<File>,
    lifecycle: Writer<File>,
    rows:      u64,
    finished:  bool,
}

impl CsvWriter {
    /// Create (truncating) both files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut status = Writer::from_path(dir.join(STATUS_FILE))?;
        status.write_record(["tick", "scenario", "status"])?;

        let mut lifecycle = Writer::from_path(dir.join(LIFECYCLE_FILE))?;
        lifecycle.write_record(["tick", "scenario", "actor", "from", "to"])?;

        Ok(Self { status, lifecycle, rows: 0, finished: false })
    }

    fn check_open(&self) -> OutputResult<()> {
        if self.finished { Err(OutputError::Finished) } else { Ok(()) }
    }
}

impl OutputWriter for CsvWriter {
    fn write_status(&mut self, row: &ScenarioStatusRow) -> OutputResult<()> {
        self.check_open()?;
        self.status.write_record([
            row.tick.to_string().as_str(),
            row.scenario.to_string().as_str(),
            row.status.as_str(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    fn write_lifecycle(&mut self, row: &LifecycleRow) -> OutputResult<()> {
        self.check_open()?;
        self.lifecycle.write_record([
            row.tick.to_string().as_str(),
            row.scenario.to_string().as_str(),
            row.actor.to_string().as_str(),
            row.from.map_or("", |s| s.as_str()),
            row.to.as_str(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.status.flush()?;
        self.lifecycle.flush()?;
        debug!(rows = self.rows, "csv_trace_flushed");
        Ok(())
    }
}
