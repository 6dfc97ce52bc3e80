//! `TraceObserver<W>` — bridges `RunnerObserver` to an `OutputWriter`.

use tracing::warn;
use ts_behavior::{LifecycleEvent, Status};
use ts_core::{ScenarioId, Tick};
use ts_scenario::RunnerObserver;

use crate::row::{LifecycleRow, ScenarioStatusRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`RunnerObserver`] that writes per-tick scenario status and every
/// lifecycle transition to any [`OutputWriter`].
///
/// Observer methods have no return value, so the first write error is kept
/// and later ones dropped.  After `runner.run()` returns, check with
/// [`take_error`][Self::take_error].
pub struct TraceObserver<W: OutputWriter> {
    writer:        W,
    /// Skip status rows while a scenario keeps reporting the same status.
    changes_only:  bool,
    last_status:   Vec<Option<Status>>,
    last_error:    Option<OutputError>,
}

impl<W: OutputWriter> TraceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, changes_only: false, last_status: Vec::new(), last_error: None }
    }

    /// Only write a status row when a scenario's status differs from the
    /// previous tick's.
    pub fn changes_only(mut self) -> Self {
        self.changes_only = true;
        self
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                warn!(error = %e, "trace_write_failed");
                self.last_error = Some(e);
            }
        }
    }

    fn status_changed(&mut self, scenario: ScenarioId, status: Status) -> bool {
        let i = scenario.index();
        if self.last_status.len() <= i {
            self.last_status.resize(i + 1, None);
        }
        let changed = self.last_status[i] != Some(status);
        self.last_status[i] = Some(status);
        changed
    }
}

impl<W: OutputWriter> RunnerObserver for TraceObserver<W> {
    fn on_scenario_status(&mut self, tick: Tick, scenario: ScenarioId, _name: &str, status: Status) {
        if self.status_changed(scenario, status) || !self.changes_only {
            let result = self.writer.write_status(&ScenarioStatusRow::new(tick, scenario, status));
            self.store_err(result);
        }
    }

    fn on_lifecycle(&mut self, event: &LifecycleEvent) {
        let result = self.writer.write_lifecycle(&LifecycleRow::from(event));
        self.store_err(result);
    }

    fn on_run_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
